//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `WIRECREST_BACKEND_URL` - Base URL of the hosted commerce backend
//!   (default: the production backend)
//! - `WIRECREST_DATA_DIR` - Client storage directory
//!   (default: `$HOME/.wirecrest`)
//! - `WIRECREST_DEBOUNCE_MS` - Quantity-update debounce window in
//!   milliseconds (default: 60)
//! - `WIRECREST_QUANTITY_ROLLBACK` - Failure policy for optimistic
//!   quantity updates: `keep-local` or `refetch` (default: `keep-local`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::{CartOptions, QuantityRollback};

const DEFAULT_BACKEND_URL: &str = "https://backend.wirecrest.in/";
const DEFAULT_DEBOUNCE_MS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Cannot determine data directory: set WIRECREST_DATA_DIR or HOME")]
    NoDataDir,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the commerce backend.
    pub backend_url: Url,
    /// Directory for client-durable storage (session record, markers).
    pub data_dir: PathBuf,
    /// Cart store tunables.
    pub cart: CartOptions,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or no
    /// data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend_url = get_env_or_default("WIRECREST_BACKEND_URL", DEFAULT_BACKEND_URL);
        let backend_url = Url::parse(&backend_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WIRECREST_BACKEND_URL".to_string(), e.to_string())
        })?;

        let data_dir = match get_optional_env("WIRECREST_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().ok_or(ConfigError::NoDataDir)?,
        };

        let debounce_ms = match get_optional_env("WIRECREST_DEBOUNCE_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("WIRECREST_DEBOUNCE_MS".to_string(), e.to_string())
            })?,
            None => DEFAULT_DEBOUNCE_MS,
        };

        let rollback = match get_optional_env("WIRECREST_QUANTITY_ROLLBACK") {
            Some(raw) => raw.parse::<QuantityRollback>().map_err(|e| {
                ConfigError::InvalidEnvVar("WIRECREST_QUANTITY_ROLLBACK".to_string(), e)
            })?,
            None => QuantityRollback::default(),
        };

        Ok(Self {
            backend_url,
            data_dir,
            cart: CartOptions {
                debounce: Duration::from_millis(debounce_ms),
                rollback,
            },
        })
    }
}

/// Default client storage location under the home directory.
fn default_data_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".wirecrest"))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend_url_parses() {
        assert!(Url::parse(DEFAULT_BACKEND_URL).is_ok());
    }

    #[test]
    fn test_default_backend_url_has_trailing_slash() {
        // Url::join replaces the last path segment otherwise.
        assert!(DEFAULT_BACKEND_URL.ends_with('/'));
    }

    #[test]
    fn test_config_construction() {
        let config = StorefrontConfig {
            backend_url: Url::parse("http://127.0.0.1:9000/").unwrap(),
            data_dir: PathBuf::from("/tmp/wirecrest-test"),
            cart: CartOptions::default(),
        };
        assert_eq!(config.cart.debounce, Duration::from_millis(60));
        assert_eq!(config.cart.rollback, QuantityRollback::KeepLocal);
    }
}
