//! One-time backend selection.
//!
//! Runs at startup, before any unit can be defined. Looks for a model
//! credential, tries to build the live backend, and falls back to the
//! degraded backend with a logged diagnostic. Never fails.

use std::fmt;
use std::sync::Arc;

use advocate_llm::{LlmProviderConfig, OpenAiCompatProvider};
use advocate_platform::env::Environment;
use advocate_types::config::BackendConfig;
use advocate_types::secret::SecretString;
use tracing::{error, info, warn};

use super::live::LiveBackend;
use super::noop::NoOpBackend;
use super::{Backend, BackendMode};

/// Provider name used in logs for the configured endpoint.
const PROVIDER_NAME: &str = "model-endpoint";

/// Outcome of backend selection. Immutable once built.
#[derive(Clone)]
pub struct BackendSelection {
    backend: Arc<dyn Backend>,
    credential_var: Option<String>,
    diagnostic: Option<String>,
}

impl BackendSelection {
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    /// Name of the environment variable the credential came from.
    pub fn credential_var(&self) -> Option<&str> {
        self.credential_var.as_deref()
    }

    /// Startup diagnostic explaining degraded mode, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// A selection that is always degraded.
    pub fn degraded(diagnostic: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(NoOpBackend),
            credential_var: None,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

impl fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSelection")
            .field("mode", &self.mode())
            .field("credential_var", &self.credential_var)
            .field("diagnostic", &self.diagnostic)
            .finish()
    }
}

/// First non-empty credential among `config.credential_env`.
fn find_credential(config: &BackendConfig, env: &dyn Environment) -> Option<(String, SecretString)> {
    config.credential_env.iter().find_map(|var| {
        let secret = SecretString::new(env.get_var(var)?);
        (!secret.is_empty()).then(|| (var.clone(), secret))
    })
}

/// Choose the process-wide backend.
pub fn select_backend(config: &BackendConfig, env: &dyn Environment) -> BackendSelection {
    let Some((var, key)) = find_credential(config, env) else {
        let diagnostic = format!(
            "No model credential found (checked {}). AI features are disabled; \
             responses will be placeholders.",
            config.credential_env.join(", ")
        );
        warn!("{diagnostic}");
        return BackendSelection::degraded(diagnostic);
    };

    let provider_config =
        LlmProviderConfig::new(PROVIDER_NAME, &config.base_url).with_timeout_secs(config.timeout_secs);

    match OpenAiCompatProvider::new(provider_config, key) {
        Ok(provider) => {
            info!(
                credential = %var,
                model = %config.model,
                base_url = %config.base_url,
                "model backend initialized"
            );
            BackendSelection {
                backend: Arc::new(LiveBackend::new(Box::new(provider), &config.model)),
                credential_var: Some(var),
                diagnostic: None,
            }
        }
        Err(e) => {
            let diagnostic = format!(
                "Failed to initialize the model backend: {e}. AI features are disabled."
            );
            error!(credential = %var, "{diagnostic}");
            BackendSelection {
                backend: Arc::new(NoOpBackend),
                credential_var: Some(var),
                diagnostic: Some(diagnostic),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advocate_platform::env::MapEnvironment;

    #[test]
    fn no_credential_selects_noop() {
        let sel = select_backend(&BackendConfig::default(), &MapEnvironment::new());
        assert_eq!(sel.mode(), BackendMode::NoOp);
        assert!(sel.credential_var().is_none());
        assert!(sel.diagnostic().unwrap().contains("GOOGLE_API_KEY, GEMINI_API_KEY"));
    }

    #[test]
    fn blank_credential_is_ignored() {
        let env = MapEnvironment::new().with_var("GOOGLE_API_KEY", "   ");
        let sel = select_backend(&BackendConfig::default(), &env);
        assert_eq!(sel.mode(), BackendMode::NoOp);
    }

    #[test]
    fn first_non_empty_wins() {
        let env = MapEnvironment::new()
            .with_var("GOOGLE_API_KEY", "")
            .with_var("GEMINI_API_KEY", "g-key");
        let sel = select_backend(&BackendConfig::default(), &env);
        assert_eq!(sel.mode(), BackendMode::Live);
        assert_eq!(sel.credential_var(), Some("GEMINI_API_KEY"));
        assert!(sel.diagnostic().is_none());
    }

    #[test]
    fn construction_failure_degrades() {
        let config = BackendConfig {
            base_url: "not a url".into(),
            ..BackendConfig::default()
        };
        let env = MapEnvironment::new().with_var("GOOGLE_API_KEY", "k");
        let sel = select_backend(&config, &env);
        assert_eq!(sel.mode(), BackendMode::NoOp);
        assert_eq!(sel.credential_var(), Some("GOOGLE_API_KEY"));
        assert!(sel.diagnostic().unwrap().starts_with("Failed to initialize the model backend"));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let env = MapEnvironment::new().with_var("GOOGLE_API_KEY", "super-secret-key");
        let sel = select_backend(&BackendConfig::default(), &env);
        assert!(!format!("{sel:?}").contains("super-secret-key"));
    }
}
