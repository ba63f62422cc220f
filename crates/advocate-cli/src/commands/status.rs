//! `advocate status` -- backend and storage diagnostics.

use advocate_platform::config_loader::discover_config_path;
use advocate_platform::{NativePlatform, Platform};

use super::{GlobalOptions, load_context};

pub async fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let loaded = load_context(opts).await?;
    let ctx = &loaded.ctx;
    let backend = &ctx.config().backend;

    println!("advocate status");
    println!("===============");
    println!();

    let config_path = match &opts.config {
        Some(path) => Some(path.clone()),
        None => {
            let platform = NativePlatform::new();
            discover_config_path(platform.fs(), platform.env(), platform.fs().home_dir()).await
        }
    };
    match config_path {
        Some(path) => println!("Config:     {}", path.display()),
        None => println!("Config:     not found (using defaults)"),
    }

    println!("Backend:    {}", ctx.selection().mode());
    match ctx.selection().credential_var() {
        Some(var) => println!("Credential: {var}"),
        None => println!("Credential: none (checked {})", backend.credential_env.join(", ")),
    }
    if let Some(diagnostic) = ctx.selection().diagnostic() {
        println!("Diagnostic: {diagnostic}");
    }
    println!("Model:      {}", backend.model);
    println!("Endpoint:   {}", backend.base_url);
    println!();

    let language = ctx.preferences().load_language().await;
    let commands = ctx.preferences().load_commands().await;
    println!("State:      {}", loaded.state_path.display());
    println!("Language:   {} ({})", language.label(), language.code());
    println!("Commands:   {}", commands.len());
    Ok(())
}
