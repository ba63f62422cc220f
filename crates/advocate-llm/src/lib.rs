//! Model transport for advocate's live backend.
//!
//! This crate knows how to talk to an OpenAI-compatible chat completion
//! endpoint. It has no notion of flows, prompts, or schemas; the core crate
//! builds requests and interprets the replies.
//!
//! # Architecture
//!
//! - [`Provider`] trait defines the chat completion interface
//! - [`OpenAiCompatProvider`] implements it over HTTP with `reqwest`
//! - [`LlmProviderConfig`] describes how to connect to an endpoint
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use advocate_llm::{ChatMessage, ChatRequest, LlmProviderConfig, OpenAiCompatProvider, Provider};
//! use advocate_types::secret::SecretString;
//!
//! let provider = OpenAiCompatProvider::new(
//!     LlmProviderConfig::new("gemini", "https://generativelanguage.googleapis.com/v1beta/openai"),
//!     SecretString::new(key),
//! )?;
//! let request = ChatRequest::new("gemini-2.0-flash", vec![ChatMessage::user("Hello")]);
//! let response = provider.complete(&request).await?;
//! println!("{:?}", response.text());
//! ```

pub mod config;
pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod types;

pub use config::LlmProviderConfig;
pub use error::{ProviderError, Result};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::Provider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ContentPart, MessageContent, Usage};
