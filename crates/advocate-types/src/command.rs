//! User-defined custom commands.
//!
//! A [`CustomCommand`] maps a spoken or typed phrase to a URL. The user's
//! commands live in an ordered [`CommandSet`]; order matters because the
//! first command whose phrase matches wins.

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::{AdvocateError, Result};

/// A phrase-to-URL shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCommand {
    /// Opaque unique identifier.
    pub id: String,
    /// Trigger phrase as entered by the user.
    pub phrase: String,
    /// URL opened when the phrase matches.
    pub action_url: String,
}

impl CustomCommand {
    /// Validate and build a command with a fresh id.
    ///
    /// Both fields are trimmed. The phrase must be non-empty and the URL must
    /// parse as an absolute URL.
    pub fn new(phrase: &str, action_url: &str) -> Result<Self> {
        let phrase = phrase.trim();
        let action_url = action_url.trim();
        if phrase.is_empty() || action_url.is_empty() {
            return Err(AdvocateError::InvalidCommand {
                reason: "phrase and action URL cannot be empty".into(),
            });
        }
        Url::parse(action_url).map_err(|e| AdvocateError::InvalidCommand {
            reason: format!("invalid action URL '{action_url}': {e}"),
        })?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            phrase: phrase.to_string(),
            action_url: action_url.to_string(),
        })
    }

    /// Case-insensitive, whitespace-trimmed exact comparison.
    pub fn matches(&self, candidate: &str) -> bool {
        self.phrase.trim().to_lowercase() == candidate.trim().to_lowercase()
    }
}

/// The user's ordered set of custom commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandSet {
    commands: Vec<CustomCommand>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<CustomCommand>) -> Self {
        Self { commands }
    }

    /// Validate and append a new command. Returns the stored command.
    pub fn add(&mut self, phrase: &str, action_url: &str) -> Result<&CustomCommand> {
        let command = CustomCommand::new(phrase, action_url)?;
        self.commands.push(command);
        let last = self.commands.len() - 1;
        Ok(&self.commands[last])
    }

    /// Remove a command by id. Returns the removed command, if any.
    pub fn remove(&mut self, id: &str) -> Option<CustomCommand> {
        let idx = self.commands.iter().position(|c| c.id == id)?;
        Some(self.commands.remove(idx))
    }

    /// First command (registration order) whose phrase matches `candidate`.
    pub fn find_by_phrase(&self, candidate: &str) -> Option<&CustomCommand> {
        if candidate.trim().is_empty() {
            return None;
        }
        self.commands.iter().find(|c| c.matches(candidate))
    }

    /// Number of commands sharing the phrase `candidate`.
    pub fn phrase_count(&self, candidate: &str) -> usize {
        self.commands.iter().filter(|c| c.matches(candidate)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// JSON array of `{id, phrase, actionUrl}` records, the format used
    /// both for persistence and as interpretation context.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.commands)?)
    }

    /// Parse the persisted JSON form.
    pub fn from_json(raw: &str) -> Result<Self> {
        let commands: Vec<CustomCommand> = serde_json::from_str(raw)?;
        Ok(Self { commands })
    }
}
