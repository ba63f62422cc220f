//! Application bootstrap and dependency wiring.
//!
//! [`AppContext`] runs backend selection once, registers the conversation
//! units against the chosen backend, and opens the preference store. It
//! then hands out an [`Orchestrator`] for a session.
//!
//! # Usage
//!
//! ```rust,ignore
//! use advocate_core::bootstrap::{AppContext, load_config};
//! use advocate_platform::{NativePlatform, Platform};
//! use advocate_platform::kv::JsonFileStore;
//!
//! let platform = NativePlatform::new();
//! let config = load_config(&platform, None).await?;
//! let store = Arc::new(JsonFileStore::new("state.json"));
//! let ctx = AppContext::new(config, platform.env(), store)?;
//! let orchestrator = ctx.into_orchestrator(host).await;
//! ```

use std::path::Path;
use std::sync::Arc;

use advocate_platform::Platform;
use advocate_platform::config_loader::load_config_raw;
use advocate_platform::env::Environment;
use advocate_platform::kv::KeyValueStore;
use advocate_types::config::Config;
use advocate_types::{AdvocateError, Result};
use tracing::{debug, info};

use crate::backend::selector::{BackendSelection, select_backend};
use crate::error::RegistryError;
use crate::flows::AiFlows;
use crate::orchestrator::{Orchestrator, SessionHost};
use crate::preferences::PreferenceStore;
use crate::registry::FlowRegistry;

/// Discover, read, and deserialize the configuration file.
///
/// A missing file yields [`Config::default`].
pub async fn load_config(platform: &dyn Platform, explicit: Option<&Path>) -> Result<Config> {
    let raw = load_config_raw(platform.fs(), platform.env(), explicit)
        .await
        .map_err(|e| AdvocateError::ConfigInvalid {
            reason: e.to_string(),
        })?;
    serde_json::from_value(raw).map_err(|e| AdvocateError::ConfigInvalid {
        reason: e.to_string(),
    })
}

/// Fully initialized application context.
pub struct AppContext {
    config: Config,
    selection: BackendSelection,
    flows: AiFlows,
    preferences: PreferenceStore,
}

impl AppContext {
    /// Select the backend and define all units.
    ///
    /// Never fails because of a missing or broken model backend; that only
    /// puts the context in degraded mode.
    pub fn new(
        config: Config,
        env: &dyn Environment,
        store: Arc<dyn KeyValueStore>,
    ) -> std::result::Result<Self, RegistryError> {
        let selection = select_backend(&config.backend, env);
        let mut registry = FlowRegistry::new(selection.backend());
        let flows = AiFlows::define(&mut registry)?;
        debug!(units = registry.names().count(), "conversation units defined");
        info!(mode = %selection.mode(), "application context ready");

        Ok(Self {
            config,
            selection,
            flows,
            preferences: PreferenceStore::new(store),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &BackendSelection {
        &self.selection
    }

    pub fn flows(&self) -> &AiFlows {
        &self.flows
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Start a conversation session driven through `host`.
    pub async fn into_orchestrator<H: SessionHost>(self, host: H) -> Orchestrator<AiFlows, H> {
        Orchestrator::start(self.flows, host, self.preferences, &self.config.session).await
    }
}
