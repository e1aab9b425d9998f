//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `BACKEND_URL` (optional): base address and port of the banking backend, defaults to `http://localhost:30701`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `REQUEST_TIMEOUT_SECS` (optional): upper bound on a single backend call, defaults to 30
/// - `SORT_CODE` (optional): bank sort code written into create/update commareas, defaults to `987654`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_sort_code")]
    pub sort_code: String,
}

/// Error raised when configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("BACKEND_URL is not a valid URL: {0}")]
    BackendUrl(#[from] url::ParseError),

    #[error("BACKEND_URL must use http or https, got {0}")]
    BackendScheme(String),
}

fn default_backend_url() -> String {
    "http://localhost:30701".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_timeout() -> u64 {
    30
}

fn default_sort_code() -> String {
    "987654".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment variable values cannot be parsed into expected types
    /// - `BACKEND_URL` is not an http(s) URL
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: backend_url -> BACKEND_URL
        let config = envy::from_env::<Config>()?;
        config.backend_base()?;
        Ok(config)
    }

    /// Parsed backend base address.
    pub fn backend_base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.backend_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::BackendScheme(other.to_string())),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            server_port: default_port(),
            request_timeout_secs: default_timeout(),
            sort_code: default_sort_code(),
        }
    }
}
