//! Configuration management for the client.

use crate::{ClientResult, Paths};
use ledger_http_proxy::{
    HttpConfig, DEFAULT_COLLECTION, DEFAULT_HOST, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the webservice.
    #[serde(default = "default_host")]
    pub host: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Basic-auth username (optional).
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password (optional).
    #[serde(default)]
    pub password: Option<String>,
    /// Collection used when a command does not name one.
    #[serde(default = "default_collection")]
    pub default_collection: String,
    /// Table used when a command does not name one.
    #[serde(default = "default_table")]
    pub default_table: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            host: default_host(),
            timeout_secs: default_timeout_secs(),
            username: None,
            password: None,
            default_collection: default_collection(),
            default_table: default_table(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults
    /// when it does not exist. Environment variables can override the log
    /// level afterwards.
    pub fn load(paths: &Paths) -> ClientResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> ClientResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("LEDGER_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Get the host as a parsed URL.
    pub fn host_url(&self) -> ClientResult<Url> {
        Ok(Url::parse(&self.host)?)
    }

    /// The transport-level slice of the configuration.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            host: self.host.clone(),
            timeout_secs: self.timeout_secs,
            username: self.username.clone(),
            password: self.password.clone(),
            default_collection: self.default_collection.clone(),
            default_table: self.default_table.clone(),
        }
    }
}
