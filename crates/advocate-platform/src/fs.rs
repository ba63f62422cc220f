//! Filesystem abstraction and native implementation.
//!
//! The native implementation is backed by [`tokio::fs`]. Only the
//! operations the config loader and the file-backed state store need are
//! exposed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Platform-agnostic filesystem operations.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a file's entire contents as a UTF-8 string.
    async fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Write a string to a file, creating parent directories if needed.
    ///
    /// Overwrites the file if it already exists.
    async fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()>;

    /// Check whether a path exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Get the user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Native filesystem implementation using [`tokio::fs`].
pub struct NativeFileSystem;

#[async_trait]
impl FileSystem for NativeFileSystem {
    async fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Sibling temp file, then rename into place.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        let fs = NativeFileSystem;

        fs.write_string(&path, "{\"a\":1}").await.unwrap();
        assert!(fs.exists(&path).await);
        assert_eq!(fs.read_to_string(&path).await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let fs = NativeFileSystem;

        fs.write_string(&path, "first").await.unwrap();
        fs.write_string(&path, "second").await.unwrap();
        assert_eq!(fs.read_to_string(&path).await.unwrap(), "second");
        assert!(!fs.exists(&path.with_extension("tmp")).await);
    }

    #[tokio::test]
    async fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem;
        let path = dir.path().join("absent");
        assert!(!fs.exists(&path).await);
        assert!(fs.read_to_string(&path).await.is_err());
    }
}
