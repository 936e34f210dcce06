//! Admin client configuration.
//!
//! # Environment Variables
//!
//! - `WIRECREST_BACKEND_URL` - Base URL of the hosted commerce backend
//!   (default: the production backend). Shared with the storefront client;
//!   both talk to the same host.

use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_URL: &str = "https://backend.wirecrest.in/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the commerce backend.
    pub backend_url: Url,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the backend URL is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let raw = std::env::var("WIRECREST_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let backend_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("WIRECREST_BACKEND_URL".to_string(), e.to_string())
        })?;

        Ok(Self { backend_url })
    }
}
