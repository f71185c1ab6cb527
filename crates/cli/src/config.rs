//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Used when neither the flag, the environment nor the config file names one
pub const DEFAULT_API_URL: &str = "http://localhost:8501";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from `~/.config/carprice/config.json`, if present
    pub fn load() -> Result<Self> {
        match dirs_next::home_dir() {
            Some(home) => Self::load_from(&Self::config_path(&home)),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn config_path(home: &Path) -> PathBuf {
        home.join(".config").join("carprice").join("config.json")
    }
}

/// Flag or environment first, then the config file, then the default
pub fn resolve_api_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url":"http://pricer.internal:8501"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://pricer.internal:8501"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_config_path() {
        assert_eq!(
            Config::config_path(Path::new("/home/u")),
            PathBuf::from("/home/u/.config/carprice/config.json")
        );
    }

    #[test]
    fn test_api_url_resolution_order() {
        let file = Config {
            api_url: Some("http://from-file:8501".to_string()),
        };
        assert_eq!(
            resolve_api_url(Some("http://flag:1".to_string()), &file),
            "http://flag:1"
        );
        assert_eq!(resolve_api_url(None, &file), "http://from-file:8501");
        assert_eq!(resolve_api_url(None, &Config::default()), DEFAULT_API_URL);
    }
}
