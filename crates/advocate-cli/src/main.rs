//! `advocate` -- terminal front end for the advocate conversational
//! assistant.
//!
//! - `advocate chat` -- interactive conversation session.
//! - `advocate ask` -- send a single message and print the reply.
//! - `advocate summarize` -- summarize a web page.
//! - `advocate commands` -- manage custom phrase-to-URL commands.
//! - `advocate status` -- show backend and storage diagnostics.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod host;

use commands::GlobalOptions;

/// Devil's advocate conversational assistant.
#[derive(Parser)]
#[command(name = "advocate", about = "Devil's advocate conversational assistant", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// State file holding the language and custom commands.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Print URLs instead of opening them.
    #[arg(long, global = true)]
    no_open: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation.
    Chat,

    /// Send a single message and print the reply.
    Ask(commands::ask::AskArgs),

    /// Summarize the content of a web page.
    Summarize(commands::summarize::SummarizeArgs),

    /// Manage custom commands.
    Commands {
        #[command(subcommand)]
        action: commands::commands_cmd::CommandsAction,
    },

    /// Show backend and storage status.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let opts = GlobalOptions {
        config: cli.config,
        state: cli.state,
        no_open: cli.no_open,
    };

    match cli.command {
        Commands::Chat => commands::chat::run(&opts).await?,
        Commands::Ask(args) => commands::ask::run(args, &opts).await?,
        Commands::Summarize(args) => commands::summarize::run(args, &opts).await?,
        Commands::Commands { action } => commands::commands_cmd::run(action, &opts).await?,
        Commands::Status => commands::status::run(&opts).await?,
    }

    Ok(())
}
