//! Terminal implementation of the session host.

use advocate_core::orchestrator::host::{Notice, SessionHost, Severity};
use advocate_types::language::Language;
use async_trait::async_trait;
use tracing::debug;

/// Prints notices to stderr and opens links in the default browser.
pub struct TerminalHost {
    no_open: bool,
}

impl TerminalHost {
    pub fn new(no_open: bool) -> Self {
        Self { no_open }
    }
}

#[async_trait]
impl SessionHost for TerminalHost {
    async fn open_url(&self, url: &str) -> std::io::Result<()> {
        if self.no_open {
            println!("[open] {url}");
            return Ok(());
        }
        let url = url.to_string();
        tokio::task::spawn_blocking(move || open::that(url))
            .await
            .map_err(std::io::Error::other)?
    }

    async fn speak(&self, text: &str, language: Language) -> std::io::Result<()> {
        debug!(language = %language.code(), chars = text.len(), "no speech output in the terminal");
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        let marker = match notice.severity {
            Severity::Info => "note",
            Severity::Error => "error",
        };
        eprintln!("[{marker}] {}: {}", notice.title, notice.description);
    }

    fn show_input(&self, text: &str) {
        eprint!("\r> {text}");
    }
}
