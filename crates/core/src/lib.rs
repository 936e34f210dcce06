//! Wirecrest Core - Shared types library.
//!
//! This crate provides common types used across all Wirecrest client components:
//! - `storefront` - Customer-facing storefront client (cart, catalog, checkout)
//! - `admin` - Admin console client (product CRUD, orders, users, reports)
//! - `cli` - Command-line interface driving both clients
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and statuses
//! - [`de`] - Lenient deserializers for the backend's loosely typed JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod de;
pub mod types;

pub use types::*;
