//! Configuration schema.
//!
//! All structs accept both `snake_case` and `camelCase` keys (the loader
//! normalizes keys, and the aliases cover configs deserialized directly).
//! Unknown fields are ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Shared default function: returns `true`.
fn default_true() -> bool {
    true
}

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model backend selection and transport settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Per-session conversation settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where user preferences and custom commands are persisted.
    #[serde(default)]
    pub storage: StorageConfig,
}

// ── Backend ──────────────────────────────────────────────────────────────

/// Settings for the live model backend.
///
/// The backend is live only when one of `credential_env` names a non-empty
/// environment variable; otherwise the degraded (NoOp) backend is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Credential environment variables, checked in order (first non-empty wins).
    #[serde(default = "default_credential_env", alias = "credentialEnv")]
    pub credential_env: Vec<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_http_timeout", alias = "timeoutSecs")]
    pub timeout_secs: u64,
}

fn default_credential_env() -> Vec<String> {
    vec!["GOOGLE_API_KEY".into(), "GEMINI_API_KEY".into()]
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_http_timeout() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            credential_env: default_credential_env(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_http_timeout(),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// Conversation settings applied when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Prefix each query with the current page URL.
    #[serde(default, alias = "shareUrl")]
    pub share_url: bool,

    /// Page URL shared as context when `share_url` is enabled.
    #[serde(default, alias = "currentUrl")]
    pub current_url: Option<String>,

    /// Speak AI replies through the host's speech output.
    #[serde(default = "default_true", alias = "audioOutput")]
    pub audio_output: bool,

    /// Upper bound on a single AI call made by the orchestrator.
    #[serde(default = "default_response_timeout", alias = "responseTimeoutSecs")]
    pub response_timeout_secs: u64,
}

fn default_response_timeout() -> u64 {
    90
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            share_url: false,
            current_url: None,
            audio_output: true,
            response_timeout_secs: default_response_timeout(),
        }
    }
}

// ── Storage ──────────────────────────────────────────────────────────────

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Path of the JSON key-value state file. Defaults to
    /// `~/.advocate/state.json`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StorageConfig {
    /// Resolve the state file path, expanding a leading `~/`.
    ///
    /// Returns `None` when no path is configured and the home directory
    /// cannot be determined.
    pub fn resolve_path(&self, home: Option<PathBuf>) -> Option<PathBuf> {
        match self.path.as_deref() {
            Some(raw) => match (raw.strip_prefix("~/"), home) {
                (Some(rest), Some(home)) => Some(home.join(rest)),
                _ => Some(PathBuf::from(raw)),
            },
            None => home.map(|h| h.join(".advocate").join("state.json")),
        }
    }
}
