//! `advocate summarize` -- summarize a web page.

use clap::Args;

use super::{GlobalOptions, load_context, print_diagnostic};

/// Arguments for the `advocate summarize` subcommand.
#[derive(Args)]
pub struct SummarizeArgs {
    /// Page to summarize.
    #[arg(long)]
    pub url: String,

    /// Extra guidance for the summary.
    #[arg(long)]
    pub context: Option<String>,
}

pub async fn run(args: SummarizeArgs, opts: &GlobalOptions) -> anyhow::Result<()> {
    let loaded = load_context(opts).await?;
    print_diagnostic(&loaded.ctx);

    let out = loaded
        .ctx
        .flows()
        .summarize_page(&args.url, args.context.as_deref())
        .await?;
    println!("{}", out.summary);
    Ok(())
}
