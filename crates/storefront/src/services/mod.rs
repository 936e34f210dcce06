//! Higher-level services composing the backend client and client storage.

pub mod auth;

pub use auth::{AuthError, AuthService, LoginOutcome};
