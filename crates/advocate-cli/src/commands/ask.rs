//! `advocate ask` -- run exactly one conversation turn.

use clap::Args;

use super::{GlobalOptions, load_context, print_diagnostic};
use crate::host::TerminalHost;

/// Arguments for the `advocate ask` subcommand.
#[derive(Args)]
pub struct AskArgs {
    /// Message to send.
    #[arg(short, long)]
    pub message: String,
}

pub async fn run(args: AskArgs, opts: &GlobalOptions) -> anyhow::Result<()> {
    let loaded = load_context(opts).await?;
    print_diagnostic(&loaded.ctx);

    let mut orchestrator = loaded
        .ctx
        .into_orchestrator(TerminalHost::new(opts.no_open))
        .await;
    let outcome = orchestrator.submit(&args.message).await?;
    println!("{}", outcome.reply());
    Ok(())
}
