//! OpenAI-compatible provider implementation.
//!
//! [`OpenAiCompatProvider`] talks to any endpoint that accepts the OpenAI
//! chat completion format. Gemini exposes one, which is the default target.

use std::time::Duration;

use advocate_types::secret::SecretString;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::types::{ChatRequest, ChatResponse};

/// A provider using the OpenAI-compatible chat completion API.
pub struct OpenAiCompatProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: SecretString,
}

impl OpenAiCompatProvider {
    /// Build a provider with an explicit API key.
    ///
    /// Fails when the key is blank, the base URL is not an absolute
    /// `http(s)` URL, or the HTTP client cannot be constructed.
    pub fn new(config: LlmProviderConfig, api_key: SecretString) -> Result<Self> {
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured("API key is empty".into()));
        }

        let base = url::Url::parse(&config.base_url).map_err(|e| {
            ProviderError::NotConfigured(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProviderError::NotConfigured(format!(
                "unsupported base URL scheme '{}'",
                base.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("http client: {e}")))?;

        Ok(Self {
            config,
            http,
            api_key,
        })
    }

    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.completions_url();

        debug!(
            provider = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let mut req = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json");

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            if status.as_u16() == 429 {
                let header_ms = parse_retry_after_header(&response);
                let body = response.text().await.unwrap_or_default();
                let retry_ms = header_ms.unwrap_or(1000);
                warn!(
                    provider = %self.config.name,
                    retry_after_ms = retry_ms,
                    body = %body,
                    "rate limited"
                );
                return Err(ProviderError::RateLimited {
                    retry_after_ms: retry_ms,
                });
            }

            let body = response.text().await.unwrap_or_default();
            let detail = extract_error_message(&body).unwrap_or(body);

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthFailed(detail),
                404 => ProviderError::ModelNotFound(format!("model '{}': {detail}", request.model)),
                _ => ProviderError::RequestFailed(format!("HTTP {status}: {detail}")),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse response: {e}"))
        })?;

        debug!(
            provider = %self.config.name,
            model = %chat_response.model,
            choices = chat_response.choices.len(),
            "chat completion response received"
        );

        Ok(chat_response)
    }
}

/// Pull `error.message` (or a bare `error` string) out of a JSON error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(String::from)
}

/// Numeric `Retry-After` header, in milliseconds.
fn parse_retry_after_header(response: &reqwest::Response) -> Option<u64> {
    let header_val = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())?;
    let secs = header_val.trim().parse::<f64>().ok()?;
    Some((secs * 1000.0).max(0.0) as u64)
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("api_key", &self.api_key)
            .finish()
    }
}
