//! Configuration management for the client.

use crate::{CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base URL (can be overridden at compile time via KRIYA_API_URL).
pub const DEFAULT_API_URL: &str = match option_env!("KRIYA_API_URL") {
    Some(url) => url,
    None => "http://localhost:3000",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Kriya backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    /// Environment variables override values from the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(level) = std::env::var("KRIYA_LOG_LEVEL") {
            if !level.is_empty() {
                self.log_level = level;
            }
        }
        if let Ok(url) = std::env::var("KRIYA_API_URL") {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        Url::parse(&self.api_url)?;
        Ok(())
    }

    /// API base URL with any trailing slash removed.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"log_level": "debug", "api_url": "https://api.kriya.dev"}"#,
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api_url, "https://api.kriya.dev");
    }

    #[test]
    fn test_load_from_file_missing_api_url_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "warn"}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_api_url_rejected() {
        let config = Config {
            log_level: "info".to_string(),
            api_url: "not a url".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = Config {
            log_level: "info".to_string(),
            api_url: "https://api.kriya.dev/".to_string(),
        };
        assert_eq!(config.api_url(), "https://api.kriya.dev");
    }
}
