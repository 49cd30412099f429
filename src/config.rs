//! Layered configuration: TOML file, then environment overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatchError};

/// Environment variable holding the subject prefix to watch for
pub const SUBJECT_ENV: &str = "SUBJECT_TO_SEARCH";

/// Environment variable holding the number of seconds between poll cycles
pub const INTERVAL_ENV: &str = "POLLING_INTERVAL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchConfig {
    /// Subjects must start with this string to match
    #[serde(default)]
    pub subject_prefix: String,
    /// Seconds to sleep between poll cycles; 0 means unset
    #[serde(default)]
    pub polling_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,
    #[serde(default = "default_token_cache")]
    pub token_cache: PathBuf,
    #[serde(default = "default_results")]
    pub results: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            credentials: default_credentials(),
            token_cache: default_token_cache(),
            results: default_results(),
        }
    }
}

fn default_credentials() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_cache() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_results() -> PathBuf {
    PathBuf::from("results.json")
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WatchError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| WatchError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    WatchError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| WatchError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| WatchError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Override file values with `SUBJECT_TO_SEARCH` / `POLLING_INTERVAL`
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(subject) = lookup(SUBJECT_ENV) {
            self.watch.subject_prefix = subject;
        }

        if let Some(raw) = lookup(INTERVAL_ENV) {
            self.watch.polling_interval_secs = raw.trim().parse().map_err(|_| {
                WatchError::ConfigError(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    INTERVAL_ENV, raw
                ))
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.watch.subject_prefix.is_empty() {
            return Err(WatchError::ConfigError(format!(
                "{} is not set (or watch.subject_prefix in the config file)",
                SUBJECT_ENV
            )));
        }

        if self.watch.polling_interval_secs == 0 {
            return Err(WatchError::ConfigError(format!(
                "{} must be set to at least 1 second \
                 (or watch.polling_interval_secs in the config file)",
                INTERVAL_ENV
            )));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.watch.polling_interval_secs)
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self {
            watch: WatchConfig {
                subject_prefix: "Alert:".to_string(),
                polling_interval_secs: 60,
            },
            paths: PathsConfig::default(),
        };
        config.save(path).await
    }
}
