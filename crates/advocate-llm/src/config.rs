//! Connection settings for an OpenAI-compatible endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// How to reach one model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Human-readable provider name, used in logs.
    pub name: String,

    /// Base URL of the OpenAI-compatible API. `/chat/completions` is
    /// appended to it.
    pub base_url: String,

    /// Extra HTTP headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
