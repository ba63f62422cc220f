//! Local key-value state.
//!
//! User preferences (language, custom commands) are persisted as string
//! values under fixed keys. [`JsonFileStore`] keeps them in one JSON object
//! file; [`MemoryStore`] is used by tests and ephemeral sessions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::fs::{FileSystem, NativeFileSystem};

/// Async string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> std::io::Result<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file. A file that is missing, unreadable
/// as JSON, or not an object reads as empty.
pub struct JsonFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, Arc::new(NativeFileSystem))
    }

    pub fn with_fs(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_map(&self) -> std::io::Result<Map<String, Value>> {
        if !self.fs.exists(&self.path).await {
            return Ok(Map::new());
        }
        let raw = self.fs.read_to_string(&self.path).await?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "state file is not a JSON object, treating as empty");
                Ok(Map::new())
            }
        }
    }

    async fn write_map(&self, map: Map<String, Value>) -> std::io::Result<()> {
        let body = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.fs.write_string(&self.path, &body).await
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> std::io::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    async fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(map).await
    }

    async fn remove(&self, key: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_crud() {
        let store = MemoryStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("state.json");

        let store = JsonFileStore::new(&path);
        store.set("selectedLanguage", "fr").await.unwrap();
        store.set("customCommands", "[]").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("selectedLanguage").await.unwrap().as_deref(),
            Some("fr")
        );
        assert_eq!(reopened.get("customCommands").await.unwrap().as_deref(), Some("[]"));

        reopened.remove("selectedLanguage").await.unwrap();
        assert!(store.get("selectedLanguage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "garbage").await.unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.get("selectedLanguage").await.unwrap().is_none());

        // Writing replaces the corrupt content.
        store.set("selectedLanguage", "hi").await.unwrap();
        assert_eq!(store.get("selectedLanguage").await.unwrap().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn non_string_values_read_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, r#"{"selectedLanguage": 7}"#).await.unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.get("selectedLanguage").await.unwrap().is_none());
    }
}
