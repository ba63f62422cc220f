//! The [`Provider`] trait for chat completions.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};

/// A provider that can execute chat completion requests.
///
/// Implementations handle authentication, request formatting, and response
/// parsing for one endpoint. Tests in the core crate substitute scripted
/// providers through this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Execute a chat completion request and return the response.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`](crate::error::ProviderError) on network
    /// failures, authentication problems, rate limiting, timeouts, or
    /// unparsable responses.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
