//! Configuration
//!
//! Runtime configuration for the auth client: where the backend lives,
//! where persisted state goes, and how long the simulated round trip
//! takes.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::storage::default_data_dir;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default simulated backend latency in milliseconds
const DEFAULT_LATENCY_MS: u64 = 500;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Auth client configuration
#[derive(Debug, Clone)]
pub struct Config {
    server_url: String,
    data_dir: PathBuf,
    latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            env::var("XFAUTH_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let data_dir = env::var("XFAUTH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        Self {
            server_url,
            data_dir,
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
        }
    }
}

impl Config {
    /// Create a configuration from environment and defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Base server URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }

    /// Directory persisted auth state is written to
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Simulated backend latency applied by the session manager
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

/// Builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    server_url: Option<String>,
    data_dir: Option<PathBuf>,
    latency: Option<Duration>,
}

impl ConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the simulated backend latency
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        let server_url = self.server_url.unwrap_or(defaults.server_url);
        if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(server_url));
        }

        Ok(Config {
            server_url,
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            latency: self.latency.unwrap_or(defaults.latency),
        })
    }
}
