//! `advocate chat` -- interactive conversation session.
//!
//! Reads lines from stdin and sends each one as a turn. Lines starting
//! with `/` are handled locally:
//!
//! ```text
//! > /media photo.png
//! > what is in this picture?
//! > /lang fr
//! > /share on
//! > /exit
//! ```

use std::path::Path;

use advocate_core::AiFlows;
use advocate_core::orchestrator::{Orchestrator, TurnOutcome};
use advocate_types::language::Language;
use tokio::io::AsyncBufReadExt;

use super::{GlobalOptions, load_context, print_diagnostic};
use crate::host::TerminalHost;

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Empty,
    Message(String),
    Media(String),
    ClearMedia,
    Lang(String),
    Share(String),
    Url(String),
    Reset,
    Help,
    Exit,
    Unknown(String),
}

fn parse_input(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Message(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim().to_string()),
        None => (command, String::new()),
    };
    match name {
        "media" => ReplInput::Media(arg),
        "clear-media" => ReplInput::ClearMedia,
        "lang" => ReplInput::Lang(arg),
        "share" => ReplInput::Share(arg),
        "url" => ReplInput::Url(arg),
        "reset" => ReplInput::Reset,
        "help" => ReplInput::Help,
        "exit" | "quit" => ReplInput::Exit,
        other => ReplInput::Unknown(other.to_string()),
    }
}

/// MIME type from a file extension.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

pub async fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let loaded = load_context(opts).await?;
    print_diagnostic(&loaded.ctx);
    let mode = loaded.ctx.selection().mode();

    let mut orchestrator = loaded
        .ctx
        .into_orchestrator(TerminalHost::new(opts.no_open))
        .await;

    println!("advocate chat -- {mode} backend (type /help for commands)");
    println!("Language: {}", orchestrator.language().label());
    println!();

    let stdin = tokio::io::stdin();
    let mut reader = tokio::io::BufReader::new(stdin).lines();

    loop {
        eprint!("> ");
        use std::io::Write;
        std::io::stderr().flush().ok();

        let Some(line) = reader.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ReplInput::Empty => continue,
            ReplInput::Exit => break,
            ReplInput::Help => print_help(),
            ReplInput::Message(text) => send(&mut orchestrator, &text).await,
            ReplInput::Media(path) => attach(&mut orchestrator, Path::new(&path)).await,
            ReplInput::ClearMedia => match orchestrator.clear_media() {
                Ok(()) => println!("[media cleared]"),
                Err(e) => eprintln!("error: {e}"),
            },
            ReplInput::Lang(code) => match Language::from_code(&code) {
                Some(lang) => match orchestrator.set_language(lang).await {
                    Ok(()) => println!("[language: {}]", lang.label()),
                    Err(e) => eprintln!("error: {e}"),
                },
                None => {
                    let supported: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                    eprintln!("unsupported language '{code}' (supported: {})", supported.join(", "));
                }
            },
            ReplInput::Share(setting) => match setting.as_str() {
                "on" => {
                    orchestrator.set_share_url(true);
                    println!("[URL sharing on]");
                }
                "off" => {
                    orchestrator.set_share_url(false);
                    println!("[URL sharing off]");
                }
                _ => eprintln!("usage: /share <on|off>"),
            },
            ReplInput::Url(url) => {
                let url = (!url.is_empty()).then_some(url);
                println!("[current URL: {}]", url.as_deref().unwrap_or("none"));
                orchestrator.set_current_url(url);
            }
            ReplInput::Reset => {
                orchestrator.clear_conversation();
                println!("[conversation cleared]");
            }
            ReplInput::Unknown(name) => eprintln!("unknown command /{name} (type /help)"),
        }
    }

    println!("Goodbye.");
    Ok(())
}

async fn send(orchestrator: &mut Orchestrator<AiFlows, TerminalHost>, text: &str) {
    match orchestrator.submit(text).await {
        Ok(outcome) => {
            if let TurnOutcome::CommandExecuted { command, .. } = &outcome {
                println!("[custom command: {}]", command.phrase);
            }
            println!("{}", outcome.reply());
            println!();
        }
        Err(e) => eprintln!("error: {e}"),
    }
}

async fn attach(orchestrator: &mut Orchestrator<AiFlows, TerminalHost>, path: &Path) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", path.display());
            return;
        }
    };
    if let Ok(kind) = orchestrator.attach_media_bytes(mime_for(path), &bytes) {
        println!("[{kind:?} attached: {}]", path.display());
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /media <path>    -- Attach an image or video to the next message");
    println!("  /clear-media     -- Drop the attached media");
    println!("  /lang <code>     -- Reply language (en, hi, es, fr)");
    println!("  /share <on|off>  -- Include the current URL as context");
    println!("  /url <url>       -- Set the current URL");
    println!("  /reset           -- Clear the conversation");
    println!("  /exit            -- Quit the session");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse_input("  hello there "), ReplInput::Message("hello there".into()));
        assert_eq!(parse_input("   "), ReplInput::Empty);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/media ./a b.png"), ReplInput::Media("./a b.png".into()));
        assert_eq!(parse_input("/clear-media"), ReplInput::ClearMedia);
        assert_eq!(parse_input("/lang  fr"), ReplInput::Lang("fr".into()));
        assert_eq!(parse_input("/share on"), ReplInput::Share("on".into()));
        assert_eq!(parse_input("/url https://a.example"), ReplInput::Url("https://a.example".into()));
        assert_eq!(parse_input("/reset"), ReplInput::Reset);
        assert_eq!(parse_input("/quit"), ReplInput::Exit);
        assert_eq!(parse_input("/nope"), ReplInput::Unknown("nope".into()));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a/B.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_for(Path::new("notes.pdf")), "application/octet-stream");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }
}
