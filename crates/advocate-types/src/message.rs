//! Conversation transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One entry in the session transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    /// Create a message stamped with a fresh id and the current time.
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Ai)
    }
}
