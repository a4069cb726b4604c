//! Application configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use token_monitor_feeds::SourceConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application configuration, loaded from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between monitor cycles.
    pub poll_interval_secs: u64,
    /// Per-request timeout for price sources.
    pub request_timeout_secs: u64,
    /// Token mapping JSON file.
    pub token_mapping_path: String,
    /// SQLite URL for monitoring configs.
    pub database_url: String,
    /// Birdeye API key (empty for the public endpoint).
    pub birdeye_api_key: String,
    /// Restart stored monitors on startup.
    pub resume_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 8,
            request_timeout_secs: 10,
            token_mapping_path: "token_mapping.json".to_string(),
            database_url: "sqlite:monitors.db".to_string(),
            birdeye_api_key: String::new(),
            resume_on_start: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            birdeye_api_key: self.birdeye_api_key.clone(),
        }
    }
}

/// Pick the bot token: the environment value if set, else the first line of `fallback`.
pub fn resolve_bot_token(env_value: Option<String>, fallback: &Path) -> Option<String> {
    let from_env = env_value
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if from_env.is_some() {
        return from_env;
    }

    fs::read_to_string(fallback)
        .ok()?
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|token| !token.is_empty())
}
