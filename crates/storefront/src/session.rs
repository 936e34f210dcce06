//! Session/identity reader.
//!
//! The login flow persists an identity record in client storage; everything
//! else derives "who is logged in" by reading it back. Absent or malformed
//! records read as "no session" - never an error - so a corrupted entry
//! degrades to the logged-out experience instead of breaking the app.
//!
//! The reader re-evaluates on the storage change notification, which keeps
//! concurrent surfaces in the process (another "tab") consistent without a
//! restart.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use wirecrest_core::de as lenient;
use wirecrest_core::{UserId, UserRole};

use crate::storage::{ClientStorage, keys};

/// The persisted identity record, written at login and removed at logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(deserialize_with = "lenient::user_id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
}

impl StoredUser {
    /// Display name for greeting surfaces.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Derived authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Session {
    /// The logged-in user, if any.
    pub user_id: Option<UserId>,
    /// Role of the logged-in user; `None` when logged out.
    pub role: Option<UserRole>,
}

impl Session {
    /// Whether an identity record is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether the logged-in user may call admin endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(UserRole::is_admin)
    }
}

/// Reads the current session out of client storage.
#[derive(Clone)]
pub struct SessionReader {
    storage: ClientStorage,
}

impl SessionReader {
    /// Create a reader over the given storage.
    #[must_use]
    pub const fn new(storage: ClientStorage) -> Self {
        Self { storage }
    }

    /// The full identity record, if one is present and well-formed.
    #[must_use]
    pub fn current_user(&self) -> Option<StoredUser> {
        self.storage.get(keys::CURRENT_USER)
    }

    /// The derived session state.
    #[must_use]
    pub fn current(&self) -> Session {
        self.current_user().map_or_else(Session::default, |user| Session {
            user_id: Some(user.id),
            role: Some(user.role),
        })
    }

    /// Storage change notifications; re-read [`Self::current`] when this
    /// fires.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.storage.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, ClientStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = ClientStorage::open(dir.path()).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_no_record_is_unauthenticated() {
        let (_dir, storage) = open_temp();
        let reader = SessionReader::new(storage);
        let session = reader.current();
        assert!(!session.is_authenticated());
        assert_eq!(session.user_id, None);
    }

    #[test]
    fn test_record_round_trips() {
        let (_dir, storage) = open_temp();
        let user = StoredUser {
            id: UserId::new(9),
            first_name: "Asha".into(),
            last_name: "Iyer".into(),
            email: "asha@example.com".into(),
            role: UserRole::Customer,
            phone: None,
        };
        storage.set(keys::CURRENT_USER, &user).unwrap();

        let reader = SessionReader::new(storage);
        let session = reader.current();
        assert_eq!(session.user_id, Some(UserId::new(9)));
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
        assert_eq!(reader.current_user().unwrap().display_name(), "Asha Iyer");
    }

    #[test]
    fn test_malformed_record_is_unauthenticated() {
        let (dir, storage) = open_temp();
        std::fs::write(dir.path().join("user.json"), b"{\"id\": \"not-a-number\"")
            .unwrap();
        let reader = SessionReader::new(storage);
        assert!(!reader.current().is_authenticated());
    }

    #[test]
    fn test_stringly_id_accepted() {
        let (dir, storage) = open_temp();
        std::fs::write(
            dir.path().join("user.json"),
            br#"{"id": "12", "email": "x@y.in", "role": "admin"}"#,
        )
        .unwrap();
        let reader = SessionReader::new(storage);
        let session = reader.current();
        assert_eq!(session.user_id, Some(UserId::new(12)));
        assert!(session.is_admin());
    }
}
