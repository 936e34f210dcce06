//! Advisory pending-update markers.
//!
//! Before a debounced quantity write goes out, the cart store records a
//! marker so a concurrent tab or a crash-recovery path can detect the
//! in-flight change. Markers are cleared on confirmed success and left in
//! place on failure; staleness is handled by an explicit TTL check on the
//! read path rather than by trusting the write path to always clean up.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wirecrest_core::{ProductId, UserId};

use super::{ClientStorage, StorageError, keys};

/// How long a marker is considered live. The expected lifetime is one
/// debounce window (~60 ms); anything older than this survived a failed
/// write or a crash.
pub const PENDING_UPDATE_TTL: Duration = Duration::from_secs(30);

/// An in-flight quantity change for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
}

impl PendingUpdate {
    /// Create a marker stamped now.
    #[must_use]
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Whether the marker is older than the given TTL.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.timestamp);
        age.to_std().is_ok_and(|age| age > ttl)
    }
}

/// The pending-update map for one user, stored under a per-user key.
pub struct PendingUpdates {
    storage: ClientStorage,
    key: String,
}

impl PendingUpdates {
    /// Bind to the marker map for the given user.
    #[must_use]
    pub fn for_user(storage: ClientStorage, user_id: UserId) -> Self {
        Self {
            key: keys::pending_updates(user_id),
            storage,
        }
    }

    /// All live (non-expired) markers. Expired markers are filtered out
    /// here, never garbage-collected in place.
    #[must_use]
    pub fn live(&self) -> HashMap<ProductId, PendingUpdate> {
        let all: HashMap<ProductId, PendingUpdate> =
            self.storage.get(&self.key).unwrap_or_default();
        all.into_iter()
            .filter(|(_, marker)| !marker.is_expired(PENDING_UPDATE_TTL))
            .collect()
    }

    /// The live marker for one product, if any.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<PendingUpdate> {
        self.live().get(&product_id).copied()
    }

    /// Record an in-flight quantity change.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn set(&self, product_id: ProductId, quantity: u32) -> Result<(), StorageError> {
        let mut all: HashMap<ProductId, PendingUpdate> =
            self.storage.get(&self.key).unwrap_or_default();
        all.insert(product_id, PendingUpdate::new(quantity));
        self.storage.set(&self.key, &all)
    }

    /// Clear the marker for one product after a confirmed write.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn clear(&self, product_id: ProductId) -> Result<(), StorageError> {
        let mut all: HashMap<ProductId, PendingUpdate> =
            self.storage.get(&self.key).unwrap_or_default();
        if all.remove(&product_id).is_some() {
            self.storage.set(&self.key, &all)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn open_temp() -> (tempfile::TempDir, ClientStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ClientStorage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_set_get_clear() {
        let (_dir, storage) = open_temp();
        let pending = PendingUpdates::for_user(storage, UserId::new(1));

        pending.set(ProductId::new(5), 3).unwrap();
        assert_eq!(pending.get(ProductId::new(5)).unwrap().quantity, 3);

        pending.clear(ProductId::new(5)).unwrap();
        assert!(pending.get(ProductId::new(5)).is_none());
    }

    #[test]
    fn test_markers_are_per_user() {
        let (_dir, storage) = open_temp();
        let a = PendingUpdates::for_user(storage.clone(), UserId::new(1));
        let b = PendingUpdates::for_user(storage, UserId::new(2));

        a.set(ProductId::new(5), 3).unwrap();
        assert!(b.get(ProductId::new(5)).is_none());
    }

    #[test]
    fn test_expired_marker_filtered_on_read() {
        let (_dir, storage) = open_temp();
        let pending = PendingUpdates::for_user(storage.clone(), UserId::new(1));

        // Write a marker backdated past the TTL, as a crashed writer would
        // have left behind.
        let stale = PendingUpdate {
            quantity: 9,
            timestamp: Utc::now() - ChronoDuration::seconds(120),
        };
        let mut all = HashMap::new();
        all.insert(ProductId::new(7), stale);
        storage
            .set(&keys::pending_updates(UserId::new(1)), &all)
            .unwrap();

        assert!(pending.get(ProductId::new(7)).is_none());
        assert!(pending.live().is_empty());
    }

    #[test]
    fn test_fresh_marker_not_expired() {
        let marker = PendingUpdate::new(2);
        assert!(!marker.is_expired(PENDING_UPDATE_TTL));
    }
}
