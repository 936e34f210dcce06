//! Client-durable storage.
//!
//! The durable analog of browser local storage: one JSON document per key
//! under a data directory. It holds the persisted identity record and the
//! advisory pending-update markers; nothing here is authoritative - the
//! backend is the source of truth.
//!
//! Writes go through a handle that bumps a revision counter on a
//! `tokio::sync::watch` channel, which is the "storage changed" signal the
//! session reader and cart store listen for. The store itself does no
//! locking: concurrent writers are last-write-wins, which is acceptable for
//! this data (markers are advisory, the identity record is written by one
//! flow at a time).
//!
//! Malformed content never surfaces as an error on the read path - it is
//! logged and treated as absent, exactly like a corrupt browser storage
//! entry would be.

pub mod pending;

pub use pending::{PENDING_UPDATE_TTL, PendingUpdate, PendingUpdates};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::watch;

/// Errors that can occur writing to client storage.
///
/// Reads deliberately have no error type: absent and malformed both read as
/// `None`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Well-known storage keys.
pub mod keys {
    use wirecrest_core::UserId;

    /// The persisted identity record for the logged-in user.
    pub const CURRENT_USER: &str = "user";

    /// Page location captured when an unauthenticated visitor tries a
    /// cart mutation, consumed after the next login.
    pub const RETURN_URL: &str = "return_url";

    /// Per-user map of in-flight quantity-update markers.
    #[must_use]
    pub fn pending_updates(user_id: UserId) -> String {
        format!("pending_updates_{user_id}")
    }
}

/// Handle to the client storage directory.
///
/// Cheaply cloneable; clones share the revision channel, so a write through
/// any clone wakes every subscriber in the process.
#[derive(Clone)]
pub struct ClientStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    dir: PathBuf,
    revision: watch::Sender<u64>,
}

impl ClientStorage {
    /// Open (creating if needed) the storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (revision, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(StorageInner { dir, revision }),
        })
    }

    /// Directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Read and decode a value. Absent or malformed entries read as `None`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read storage entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "malformed storage entry, treating as absent");
                None
            }
        }
    }

    /// Encode and write a value, then notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the filesystem write fails.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(value)?;
        fs::write(self.path_for(key), encoded)?;
        self.bump();
        Ok(())
    }

    /// Remove a value, then notify subscribers. Removing an absent key is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem removal fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                self.bump();
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Subscribe to change notifications. The value is a monotonically
    /// increasing revision; subscribers should re-read whatever keys they
    /// care about when it moves.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Signal subscribers that storage changed outside this handle (e.g.
    /// another process wrote the directory).
    pub fn notify_external_change(&self) {
        self.bump();
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    /// Map a key to a file path, keeping the name filesystem-safe.
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.inner.dir.join(format!("{safe}.json"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        n: u32,
    }

    fn open_temp() -> (tempfile::TempDir, ClientStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ClientStorage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_dir, storage) = open_temp();
        storage.set("probe", &Probe { n: 7 }).unwrap();
        assert_eq!(storage.get::<Probe>("probe"), Some(Probe { n: 7 }));
    }

    #[test]
    fn test_absent_key_reads_none() {
        let (_dir, storage) = open_temp();
        assert_eq!(storage.get::<Probe>("missing"), None);
    }

    #[test]
    fn test_malformed_entry_reads_none() {
        let (dir, storage) = open_temp();
        std::fs::write(dir.path().join("probe.json"), b"{not json").unwrap();
        assert_eq!(storage.get::<Probe>("probe"), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, storage) = open_temp();
        storage.set("probe", &Probe { n: 1 }).unwrap();
        storage.remove("probe").unwrap();
        storage.remove("probe").unwrap();
        assert_eq!(storage.get::<Probe>("probe"), None);
    }

    #[test]
    fn test_writes_notify_subscribers() {
        let (_dir, storage) = open_temp();
        let rx = storage.subscribe();
        let before = *rx.borrow();
        storage.set("probe", &Probe { n: 1 }).unwrap();
        storage.remove("probe").unwrap();
        assert_eq!(*rx.borrow(), before + 2);
    }

    #[test]
    fn test_clones_share_notifications() {
        let (_dir, storage) = open_temp();
        let clone = storage.clone();
        let rx = storage.subscribe();
        let before = *rx.borrow();
        clone.set("probe", &Probe { n: 2 }).unwrap();
        assert_eq!(*rx.borrow(), before + 1);
    }

    #[test]
    fn test_external_change_notification() {
        let (dir, storage) = open_temp();
        let rx = storage.subscribe();
        let before = *rx.borrow();

        // Another process wrote the directory; the caller relays it.
        std::fs::write(dir.path().join("user.json"), b"{\"id\": 1}").unwrap();
        storage.notify_external_change();
        assert_eq!(*rx.borrow(), before + 1);
    }

    #[test]
    fn test_keys_are_sanitized() {
        let (dir, storage) = open_temp();
        storage.set("weird/../key", &Probe { n: 3 }).unwrap();
        assert!(dir.path().join("weird____key.json").exists());
        assert_eq!(storage.get::<Probe>("weird/../key"), Some(Probe { n: 3 }));
    }
}
