//! CLI command implementations for `advocate`.
//!
//! - [`chat`] -- interactive session over the conversation orchestrator.
//! - [`ask`] -- one turn, printed.
//! - [`summarize`] -- page summarization.
//! - [`commands_cmd`] -- custom command management.
//! - [`status`] -- diagnostics.

pub mod ask;
pub mod chat;
pub mod commands_cmd;
pub mod status;
pub mod summarize;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use advocate_core::bootstrap::{AppContext, load_config};
use advocate_platform::kv::JsonFileStore;
use advocate_platform::{NativePlatform, Platform};

/// Flags shared by every subcommand.
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub no_open: bool,
}

/// Application context plus where its state lives.
pub struct Loaded {
    pub ctx: AppContext,
    pub state_path: PathBuf,
}

/// Load configuration, open the state file, and select the backend.
pub async fn load_context(opts: &GlobalOptions) -> anyhow::Result<Loaded> {
    let platform = NativePlatform::new();

    if let Some(path) = &opts.config {
        if !platform.fs().exists(path).await {
            anyhow::bail!("config file not found: {}", path.display());
        }
    }
    let config = load_config(&platform, opts.config.as_deref()).await?;

    let state_path = match &opts.state {
        Some(path) => path.clone(),
        None => config
            .storage
            .resolve_path(platform.fs().home_dir())
            .context("cannot determine where to keep state; pass --state <path>")?,
    };

    let store = JsonFileStore::new(&state_path);
    let ctx = AppContext::new(config, platform.env(), Arc::new(store))?;
    Ok(Loaded { ctx, state_path })
}

/// Print the startup diagnostic when running degraded.
pub fn print_diagnostic(ctx: &AppContext) {
    if let Some(diagnostic) = ctx.selection().diagnostic() {
        eprintln!("warning: {diagnostic}");
    }
}
