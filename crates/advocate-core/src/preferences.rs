//! Persisted user preferences.
//!
//! The selected language and the custom command list live in a
//! [`KeyValueStore`] under fixed keys. Stored data that does not parse is
//! discarded rather than failing the session.

use std::sync::Arc;

use advocate_platform::kv::KeyValueStore;
use advocate_types::command::{CommandSet, CustomCommand};
use advocate_types::language::Language;
use advocate_types::{AdvocateError, Result};
use tracing::{debug, warn};

pub const LANGUAGE_KEY: &str = "selectedLanguage";
pub const COMMANDS_KEY: &str = "customCommands";

/// Typed access to the preference keys.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored language, or English when missing or unsupported. A missing
    /// or unsupported value is replaced in the store.
    pub async fn load_language(&self) -> Language {
        let stored = match self.store.get(LANGUAGE_KEY).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "could not read stored language, using default");
                return Language::default();
            }
        };

        if let Some(lang) = stored.as_deref().and_then(Language::from_code) {
            return lang;
        }

        if let Some(raw) = &stored {
            warn!(stored = %raw, "unsupported stored language, resetting to default");
        }
        let lang = Language::default();
        if let Err(e) = self.save_language(lang).await {
            warn!(error = %e, "could not persist default language");
        }
        lang
    }

    pub async fn save_language(&self, lang: Language) -> Result<()> {
        self.store
            .set(LANGUAGE_KEY, lang.code())
            .await
            .map_err(storage_error)
    }

    /// Stored custom commands. Malformed data is removed and an empty set
    /// returned.
    pub async fn load_commands(&self) -> CommandSet {
        let raw = match self.store.get(COMMANDS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return CommandSet::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored custom commands");
                return CommandSet::new();
            }
        };

        match CommandSet::from_json(&raw) {
            Ok(set) => {
                debug!(count = set.len(), "loaded custom commands");
                set
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed custom command data");
                if let Err(e) = self.store.remove(COMMANDS_KEY).await {
                    warn!(error = %e, "could not remove malformed custom command data");
                }
                CommandSet::new()
            }
        }
    }

    pub async fn save_commands(&self, commands: &CommandSet) -> Result<()> {
        let json = commands.to_json()?;
        self.store
            .set(COMMANDS_KEY, &json)
            .await
            .map_err(storage_error)
    }

    /// Validate, append, and persist a command.
    pub async fn add_command(&self, phrase: &str, action_url: &str) -> Result<CustomCommand> {
        let mut commands = self.load_commands().await;
        let added = commands.add(phrase, action_url)?.clone();
        self.save_commands(&commands).await?;
        Ok(added)
    }

    /// Delete a command by id and persist. Returns the removed command.
    pub async fn remove_command(&self, id: &str) -> Result<Option<CustomCommand>> {
        let mut commands = self.load_commands().await;
        let removed = commands.remove(id);
        if removed.is_some() {
            self.save_commands(&commands).await?;
        }
        Ok(removed)
    }
}

fn storage_error(e: std::io::Error) -> AdvocateError {
    AdvocateError::Storage {
        reason: e.to_string(),
    }
}
