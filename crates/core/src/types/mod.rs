//! Core types for Wirecrest.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{format_inr, line_total};
pub use status::*;
