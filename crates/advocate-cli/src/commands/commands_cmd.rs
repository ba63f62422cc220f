//! `advocate commands` -- list, add, and remove custom commands.

use clap::Subcommand;
use comfy_table::{Table, presets::UTF8_FULL};

use super::{GlobalOptions, load_context};

/// Subcommands for `advocate commands`.
#[derive(Subcommand)]
pub enum CommandsAction {
    /// List custom commands in match order.
    List,

    /// Add a custom command.
    Add {
        /// Trigger phrase.
        #[arg(long)]
        phrase: String,

        /// URL opened when the phrase is spoken or typed.
        #[arg(long)]
        url: String,
    },

    /// Remove a custom command by ID.
    Remove {
        /// Command ID (see `advocate commands list`).
        id: String,
    },
}

pub async fn run(action: CommandsAction, opts: &GlobalOptions) -> anyhow::Result<()> {
    let loaded = load_context(opts).await?;
    let prefs = loaded.ctx.preferences();

    match action {
        CommandsAction::List => {
            let commands = prefs.load_commands().await;
            if commands.is_empty() {
                println!("No custom commands.");
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(["ID", "PHRASE", "URL"]);
            for cmd in commands.iter() {
                table.add_row([&cmd.id, &cmd.phrase, &cmd.action_url]);
            }
            println!("{table}");
        }
        CommandsAction::Add { phrase, url } => {
            let added = prefs.add_command(&phrase, &url).await?;
            println!("Added \"{}\" -> {} ({})", added.phrase, added.action_url, added.id);
        }
        CommandsAction::Remove { id } => match prefs.remove_command(&id).await? {
            Some(removed) => println!("Removed \"{}\"", removed.phrase),
            None => anyhow::bail!("no custom command with id {id}"),
        },
    }
    Ok(())
}
