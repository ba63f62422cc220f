//! Request and response types for chat completion calls.
//!
//! These mirror the OpenAI chat completion wire format. Only the subset the
//! live backend needs is modelled: text and image content parts, JSON
//! response format, and a single non-streamed reply.

use serde::{Deserialize, Serialize};

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The role of the message author ("system", "user", "assistant").
    pub role: String,

    /// Plain text or a list of content parts.
    pub content: MessageContent,
}

/// Message body: either a bare string or multimodal parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference; a `data:` URI or a remote URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// User message carrying text followed by one image/video data URI.
    pub fn user_with_media(text: impl Into<String>, data_uri: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_uri.into(),
                    },
                },
            ]),
        }
    }

    /// Concatenated text of the message, ignoring non-text parts.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Output format constraint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// Ask the model for a single JSON object.
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,

    pub messages: Vec<ChatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            response_format: None,
        }
    }

    pub fn with_json_output(mut self) -> Self {
        self.response_format = Some(ResponseFormat::json_object());
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,

    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<Usage>,

    #[serde(default)]
    pub model: String,
}

impl ChatResponse {
    /// Text of the first choice, if any. Empty strings count as absent.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// A single completion choice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Choice {
    #[serde(default)]
    pub index: i32,

    pub message: AssistantMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant reply inside a choice. `content` is `null` when the model
/// produced nothing (e.g. a safety block).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Usage {
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
}
