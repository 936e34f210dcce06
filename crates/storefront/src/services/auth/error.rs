//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Backend refused the credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Identity record could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
