//! Commerce backend API client.
//!
//! # Architecture
//!
//! - One hosted HTTP backend owns all business logic: pricing, inventory
//!   decrement, order persistence, authentication decisions
//! - Cart operations multiplex through a single endpoint with a
//!   mode-tagged JSON body; the request union is typed ([`CartRequest`])
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL); cart
//!   and order state is never cached - it is mutable server state
//! - Requests carry no token beyond the `user_id` value; the backend is
//!   trusted to validate session ownership
//!
//! # Example
//!
//! ```rust,ignore
//! use wirecrest_storefront::backend::CommerceClient;
//!
//! let client = CommerceClient::new(&config.backend_url);
//!
//! let products = client.products().await?;
//! client.add_to_cart(user_id, products[0].id, 1).await?;
//! let lines = client.fetch_cart(user_id).await?;
//! ```

mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend reported a business failure (`status != "success"`).
    #[error("rejected by backend: {0}")]
    Rejected(String),

    /// Response parsed but did not have the documented shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Endpoint URL could not be built from the configured base.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Rejected("out of stock".to_string());
        assert_eq!(err.to_string(), "rejected by backend: out of stock");

        let err = BackendError::NotFound("product 9".to_string());
        assert_eq!(err.to_string(), "not found: product 9");
    }
}
