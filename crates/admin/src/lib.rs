//! Wirecrest Admin client library.
//!
//! Client for the store-management surface of the commerce backend:
//! product CRUD (with image upload), order status management, user
//! management, inventory levels, sales reporting, and announcements.
//!
//! # Security
//!
//! The backend gates these endpoints on the caller's account role; the
//! client sends no token beyond user-identifying fields. Callers should
//! still check [`wirecrest_core::UserRole::is_admin`] on the local session
//! before offering admin operations, purely as a UX guard.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod config;
pub mod error;
pub mod reports;
pub mod types;

pub use client::AdminClient;
pub use error::AdminError;
