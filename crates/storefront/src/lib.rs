//! Wirecrest Storefront client library.
//!
//! Everything a customer-facing surface needs to talk to the Wirecrest
//! commerce backend: session/identity handling, an optimistic synchronized
//! cart store, catalog access, checkout, and account operations.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local database, direct API calls
//! - Client-durable storage (one JSON document per key) holds the identity
//!   record and advisory pending-update markers
//! - Cart mutations are optimistic: local state changes immediately, the
//!   backend write follows, and a full refetch reconciles any drift
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use wirecrest_storefront::{
//!     backend::CommerceClient, cart::CartStore, config::StorefrontConfig,
//!     storage::ClientStorage,
//! };
//!
//! let config = StorefrontConfig::from_env()?;
//! let storage = ClientStorage::open(&config.data_dir)?;
//! let backend = CommerceClient::new(&config.backend_url);
//!
//! let cart = CartStore::connect(backend, storage, config.cart).await;
//! if !cart.add_to_cart(product.id).await {
//!     // not logged in - send the user to the login view
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{Result, StorefrontError};
