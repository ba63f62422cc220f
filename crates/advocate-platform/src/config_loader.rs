//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. An explicit path passed by the caller (the CLI's `--config`).
//! 2. `ADVOCATE_CONFIG` environment variable.
//! 3. `~/.advocate/config.json`
//! 4. If none found, an empty JSON object (`{}`), so every setting takes
//!    its default.
//!
//! JSON keys are normalized from camelCase to snake_case before returning.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::env::Environment;
use crate::fs::FileSystem;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV_VAR: &str = "ADVOCATE_CONFIG";

/// Errors raised while loading a config file that was found.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Pick the config file candidate.
///
/// An `ADVOCATE_CONFIG` value is returned as-is; the caller checks whether
/// it exists. The home-directory default is returned only when present.
pub async fn discover_config_path(
    fs: &dyn FileSystem,
    env: &dyn Environment,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(env_path) = env.get_var(CONFIG_ENV_VAR) {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let home_path = home_dir?.join(".advocate").join("config.json");
    if fs.exists(&home_path).await {
        Some(home_path)
    } else {
        None
    }
}

/// Load raw, key-normalized JSON configuration.
///
/// The caller deserializes the result into `advocate_types::config::Config`.
pub async fn load_config_raw(
    fs: &dyn FileSystem,
    env: &dyn Environment,
    explicit: Option<&Path>,
) -> Result<Value, ConfigLoadError> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config_path(fs, env, fs.home_dir()).await,
    };

    let Some(path) = path else {
        tracing::info!("no config file found, using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    };

    if !fs.exists(&path).await {
        tracing::warn!(path = %path.display(), "config path does not exist, using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    }

    tracing::debug!(path = %path.display(), "loading config file");
    let contents = fs
        .read_to_string(&path)
        .await
        .map_err(|source| ConfigLoadError::Read {
            path: path.clone(),
            source,
        })?;

    let value: Value = serde_json::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.clone(),
        source,
    })?;

    if !value.is_object() {
        return Err(ConfigLoadError::NotAnObject { path });
    }

    Ok(normalize_keys(value))
}

/// Convert camelCase object keys to snake_case, recursing through objects
/// and arrays.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| (camel_to_snake(&key), normalize_keys(val)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a single camelCase key to snake_case.
///
/// Runs of capitals are treated as one acronym word:
///
/// ```
/// # use advocate_platform::config_loader::camel_to_snake;
/// assert_eq!(camel_to_snake("shareUrl"), "share_url");
/// assert_eq!(camel_to_snake("baseURL"), "base_url");
/// assert_eq!(camel_to_snake("HTTPTimeoutSecs"), "http_timeout_secs");
/// assert_eq!(camel_to_snake("already_snake"), "already_snake");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvironment;
    use crate::fs::NativeFileSystem;

    #[test]
    fn camel_to_snake_cases() {
        assert_eq!(camel_to_snake("credentialEnv"), "credential_env");
        assert_eq!(camel_to_snake("responseTimeoutSecs"), "response_timeout_secs");
        assert_eq!(camel_to_snake("getHTMLParser"), "get_html_parser");
        assert_eq!(camel_to_snake("simpleXML"), "simple_xml");
        assert_eq!(camel_to_snake("model"), "model");
        assert_eq!(camel_to_snake(""), "");
        assert_eq!(camel_to_snake("A"), "a");
    }

    #[test]
    fn normalize_recurses() {
        let raw = serde_json::json!({
            "session": {"shareUrl": true, "currentUrl": "https://x.example"},
            "backend": {"credentialEnv": ["MY_KEY"]},
            "list": [{"innerKey": 1}]
        });
        let norm = normalize_keys(raw);
        assert_eq!(norm["session"]["share_url"], true);
        assert_eq!(norm["session"]["current_url"], "https://x.example");
        // Values are untouched, only keys.
        assert_eq!(norm["backend"]["credential_env"][0], "MY_KEY");
        assert_eq!(norm["list"][0]["inner_key"], 1);
    }

    #[tokio::test]
    async fn env_var_wins_over_home() {
        let env = MapEnvironment::new().with_var(CONFIG_ENV_VAR, "/custom/advocate.json");
        let found = discover_config_path(&NativeFileSystem, &env, Some(PathBuf::from("/home/u"))).await;
        assert_eq!(found, Some(PathBuf::from("/custom/advocate.json")));
    }

    #[tokio::test]
    async fn home_default_only_when_present() {
        let home = tempfile::tempdir().unwrap();
        let env = MapEnvironment::new();
        let fs = NativeFileSystem;

        assert!(discover_config_path(&fs, &env, Some(home.path().to_path_buf())).await.is_none());

        let path = home.path().join(".advocate").join("config.json");
        fs.write_string(&path, "{}").await.unwrap();
        assert_eq!(
            discover_config_path(&fs, &env, Some(home.path().to_path_buf())).await,
            Some(path)
        );
    }

    #[tokio::test]
    async fn missing_explicit_path_yields_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_config_raw(
            &NativeFileSystem,
            &MapEnvironment::new(),
            Some(&dir.path().join("nope.json")),
        )
        .await
        .unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn loads_and_normalizes_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"session": {"audioOutput": false}}"#)
            .await
            .unwrap();

        let value = load_config_raw(&NativeFileSystem, &MapEnvironment::new(), Some(&path))
            .await
            .unwrap();
        assert_eq!(value["session"]["audio_output"], false);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        let err = load_config_raw(&NativeFileSystem, &MapEnvironment::new(), Some(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));

        tokio::fs::write(&path, "[1, 2]").await.unwrap();
        let err = load_config_raw(&NativeFileSystem, &MapEnvironment::new(), Some(&path))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotAnObject { .. }));
    }
}
