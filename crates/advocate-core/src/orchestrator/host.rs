//! The session's outward-facing side: link opening, speech output,
//! notices, and the input field.

use advocate_types::language::Language;
use async_trait::async_trait;

/// How prominent a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }
}

/// Collaborator the orchestrator drives.
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// Open `url` for the user.
    async fn open_url(&self, url: &str) -> std::io::Result<()>;

    /// Speak `text` aloud in `language`.
    async fn speak(&self, text: &str, language: Language) -> std::io::Result<()>;

    fn notify(&self, notice: Notice);

    /// Reflect an interim transcript in the input field without sending it.
    fn show_input(&self, text: &str);
}
