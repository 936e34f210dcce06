//! Optimistic cart store synchronized against the commerce backend.
//!
//! # Architecture
//!
//! - The backend owns the cart; the store keeps a best-effort in-memory
//!   mirror that views read and subscribe to
//! - Mutations are optimistic: local state changes immediately, the network
//!   write follows, and a wholesale refetch is the reconciliation strategy
//!   (no fine-grained merging)
//! - Quantity changes are debounced per product (~60 ms): a burst of
//!   stepper clicks collapses into one write carrying the final value
//! - Failures are logged and never propagated to callers; the next
//!   successful fetch is the recovery mechanism
//!
//! # Lifecycle
//!
//! A store is an explicitly-scoped object: [`CartStore::connect`] reads the
//! session, performs the initial fetch, and starts a listener that re-checks
//! the session whenever client storage changes (a login or logout from
//! another surface). Call [`CartStore::shutdown`] when done with it; tests
//! construct isolated instances against their own storage directories.
//!
//! # Ordering
//!
//! Per-product updates are serialized through the debounce map - only the
//! latest pending value per product is ever sent. There is no cross-product
//! ordering guarantee, and a refetch may race an in-flight write; the
//! design accepts eventual consistency, favoring responsiveness.

mod debounce;

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::instrument;

use wirecrest_core::{ProductId, UserId, line_total};

use crate::backend::{CartLineItem, CommerceClient};
use crate::session::{Session, SessionReader};
use crate::storage::{ClientStorage, PendingUpdates, keys};

use debounce::DebounceMap;

/// What to do with the optimistic local value when a debounced quantity
/// write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityRollback {
    /// Keep the user's intended value and let the next successful fetch
    /// self-heal the drift.
    #[default]
    KeepLocal,
    /// Refetch immediately, rolling the line back to the backend's value.
    Refetch,
}

impl std::str::FromStr for QuantityRollback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-local" => Ok(Self::KeepLocal),
            "refetch" => Ok(Self::Refetch),
            other => Err(format!(
                "unknown rollback policy '{other}' (expected 'keep-local' or 'refetch')"
            )),
        }
    }
}

/// Tunables for a cart store.
#[derive(Debug, Clone, Copy)]
pub struct CartOptions {
    /// Idle window before a quantity change is written to the backend.
    /// Short enough to feel instantaneous, long enough to coalesce a
    /// burst of stepper clicks.
    pub debounce: Duration,
    /// Failure policy for optimistic quantity updates.
    pub rollback: QuantityRollback,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(60),
            rollback: QuantityRollback::KeepLocal,
        }
    }
}

/// Snapshot of the cart mirror.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// Current line items, at most one per product id.
    pub items: Vec<CartLineItem>,
    /// True once the initial fetch has completed - success or failure -
    /// so views never block indefinitely.
    pub loaded: bool,
}

impl CartState {
    /// Quantity of a product in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| item.id == product_id)
            .map(|item| item.quantity)
    }

    /// Whether the product has a line item.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.quantity_of(product_id).is_some()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line totals (GST-inclusive).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| line_total(item.price, item.quantity))
            .sum()
    }
}

/// Keep at most one line per product id, preserving order of first
/// appearance. The backend upholds this invariant; a duplicate row here
/// means a server-side bug, so it is logged rather than silently merged.
fn dedupe_by_id(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.id) {
            out.push(item);
        } else {
            tracing::warn!(product_id = %item.id, "duplicate cart line from backend, dropping");
        }
    }
    out
}

// =============================================================================
// CartStore
// =============================================================================

/// Handle to the cart store. Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    backend: CommerceClient,
    storage: ClientStorage,
    options: CartOptions,
    session: RwLock<Session>,
    state: watch::Sender<CartState>,
    timers: DebounceMap,
    /// Where the user currently "is", reported by the consuming view, so an
    /// unauthenticated add can capture a post-login return target.
    location: RwLock<String>,
    session_listener: Mutex<Option<JoinHandle<()>>>,
}

impl CartStore {
    /// Build the store, read the session, start the storage listener, and
    /// perform the initial fetch.
    ///
    /// The initial fetch never fails the construction: on error the cart is
    /// simply empty with `loaded` set, per the store's failure semantics.
    pub async fn connect(
        backend: CommerceClient,
        storage: ClientStorage,
        options: CartOptions,
    ) -> Self {
        let session = SessionReader::new(storage.clone()).current();
        let (state, _) = watch::channel(CartState::default());

        let store = Self {
            inner: Arc::new(CartStoreInner {
                backend,
                storage,
                options,
                session: RwLock::new(session),
                state,
                timers: DebounceMap::new(),
                location: RwLock::new("/".to_string()),
                session_listener: Mutex::new(None),
            }),
        };

        store.spawn_session_listener();
        store.fetch_cart().await;
        store
    }

    /// Stop background work: the storage listener and any pending debounced
    /// writes. The last-known state remains readable.
    pub fn shutdown(&self) {
        if let Some(task) = lock(&self.inner.session_listener).take() {
            task.abort();
        }
        self.inner.timers.cancel_all();
    }

    // =========================================================================
    // State access (the consuming-view contract)
    // =========================================================================

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Whether the initial fetch has completed (success or failure).
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.inner.state.borrow().loaded
    }

    /// The session the store currently operates under.
    #[must_use]
    pub fn session(&self) -> Session {
        *read(&self.inner.session)
    }

    /// Report the user's current page location, used as the post-login
    /// return target when an unauthenticated add is rejected.
    pub fn set_location(&self, path: &str) {
        *write(&self.inner.location) = path.to_string();
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace the local mirror wholesale from the backend.
    ///
    /// Never fails: on error the previous items stay, the condition is
    /// logged, and `loaded` is still set so callers don't hang. For an
    /// unauthenticated session this resolves immediately with an empty cart.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) {
        let Some(user_id) = self.session().user_id else {
            self.inner.state.send_modify(|state| {
                state.items.clear();
                state.loaded = true;
            });
            return;
        };

        match self.inner.backend.fetch_cart(user_id).await {
            Ok(items) => {
                let items = dedupe_by_id(items);
                self.inner.state.send_modify(|state| {
                    state.items = items;
                    state.loaded = true;
                });
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "cart fetch failed, keeping previous state");
                self.inner.state.send_modify(|state| state.loaded = true);
            }
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// Returns `false` without any network traffic when no session is
    /// present - the current location is captured for a post-login redirect
    /// and the caller is expected to send the user to the login view.
    /// Returns `false` (after logging) on any backend failure; never panics.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId) -> bool {
        let Some(user_id) = self.session().user_id else {
            let location = read(&self.inner.location).clone();
            if let Err(e) = self.inner.storage.set(keys::RETURN_URL, &location) {
                tracing::warn!(error = %e, "failed to record return location");
            }
            return false;
        };

        match self.inner.backend.add_to_cart(user_id, product_id, 1).await {
            Ok(()) => {
                self.fetch_cart().await;
                true
            }
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %e, "add to cart failed");
                false
            }
        }
    }

    /// Set the quantity of a line item, optimistically and debounced.
    ///
    /// The local mirror changes immediately; the backend write goes out
    /// only after the debounce window passes with no further change for the
    /// same product, carrying the final value. Quantities below 1 are
    /// rejected locally - removal is a separate, explicit operation.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub fn update_quantity(&self, product_id: ProductId, quantity: u32) {
        if quantity < 1 {
            tracing::debug!(product_id = %product_id, "rejecting quantity below 1");
            return;
        }
        let Some(user_id) = self.session().user_id else {
            tracing::debug!("ignoring quantity update without a session");
            return;
        };

        let mut known = false;
        self.inner.state.send_modify(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| item.id == product_id) {
                item.quantity = quantity;
                known = true;
            }
        });
        if !known {
            tracing::warn!(product_id = %product_id, "quantity update for product not in cart");
            return;
        }

        // Advisory marker so a concurrent surface or a crash-recovery path
        // can see the in-flight change.
        if let Err(e) = self.pending(user_id).set(product_id, quantity) {
            tracing::warn!(error = %e, "failed to record pending-update marker");
        }

        let store = self.clone();
        self.inner
            .timers
            .restart(product_id, self.inner.options.debounce, async move {
                store.push_quantity(user_id, product_id, quantity).await;
            });
    }

    /// The deferred write behind [`Self::update_quantity`].
    async fn push_quantity(&self, user_id: UserId, product_id: ProductId, quantity: u32) {
        match self
            .inner
            .backend
            .update_cart_quantity(user_id, product_id, quantity)
            .await
        {
            Ok(()) => {
                if let Err(e) = self.pending(user_id).clear(product_id) {
                    tracing::warn!(error = %e, "failed to clear pending-update marker");
                }
                self.fetch_cart().await;
            }
            Err(e) => {
                // Marker intentionally stays; readers expire it by TTL.
                tracing::error!(product_id = %product_id, error = %e, "quantity update failed");
                if self.inner.options.rollback == QuantityRollback::Refetch {
                    self.fetch_cart().await;
                }
            }
        }
    }

    /// Remove a line item. Removal is decisive and infrequent, so it is
    /// sent immediately - no debounce - and supersedes any pending quantity
    /// write for the same product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: ProductId) {
        let Some(user_id) = self.session().user_id else {
            tracing::debug!("ignoring removal without a session");
            return;
        };

        if self.inner.timers.cancel(product_id) {
            tracing::debug!(product_id = %product_id, "canceled pending quantity write");
        }
        if let Err(e) = self.pending(user_id).clear(product_id) {
            tracing::warn!(error = %e, "failed to clear pending-update marker");
        }

        match self.inner.backend.remove_from_cart(user_id, product_id).await {
            Ok(()) => self.fetch_cart().await,
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %e, "remove from cart failed");
            }
        }
    }

    /// Re-read the session from storage and react to a user change:
    /// fetch for a new login, reset to empty for a logout.
    pub async fn refresh_session(&self) {
        let next = SessionReader::new(self.inner.storage.clone()).current();
        let previous = {
            let mut session = write(&self.inner.session);
            let previous = *session;
            *session = next;
            previous
        };

        if previous.user_id == next.user_id {
            return;
        }

        self.inner.timers.cancel_all();
        if next.is_authenticated() {
            tracing::debug!(user_id = ?next.user_id, "session appeared, fetching cart");
            self.fetch_cart().await;
        } else {
            tracing::debug!("session gone, resetting cart");
            self.inner.state.send_modify(|state| {
                state.items.clear();
                state.loaded = true;
            });
        }
    }

    /// Markers for the given user.
    fn pending(&self, user_id: UserId) -> PendingUpdates {
        PendingUpdates::for_user(self.inner.storage.clone(), user_id)
    }

    /// Watch client storage and re-evaluate the session on every change.
    ///
    /// The task holds only a weak reference so an abandoned store can be
    /// collected; [`Self::shutdown`] aborts it eagerly.
    fn spawn_session_listener(&self) {
        let weak = Arc::downgrade(&self.inner);
        let mut revisions = SessionReader::new(self.inner.storage.clone()).subscribe();

        let task = tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                let Some(inner) = weak.upgrade() else { break };
                Self { inner }.refresh_session().await;
            }
        });

        *lock(&self.inner.session_listener) = Some(task);
    }
}

// Poison recovery for the store's short-lived guards: a panic elsewhere
// must not wedge the cart.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn line(id: i32, price: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("product {id}"),
            image: None,
            price: Decimal::new(price, 2),
            quantity,
        }
    }

    #[test]
    fn test_cart_state_accessors() {
        let state = CartState {
            items: vec![line(5, 10_000, 2), line(9, 5_000, 1)],
            loaded: true,
        };
        assert_eq!(state.quantity_of(ProductId::new(5)), Some(2));
        assert!(state.contains(ProductId::new(9)));
        assert!(!state.contains(ProductId::new(1)));
        assert_eq!(state.item_count(), 3);
        assert_eq!(state.subtotal(), Decimal::new(25_000, 2));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let deduped = dedupe_by_id(vec![line(5, 100, 2), line(7, 100, 1), line(5, 100, 9)]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].quantity, 2);
    }

    #[test]
    fn test_rollback_policy_parsing() {
        assert_eq!(
            "keep-local".parse::<QuantityRollback>().unwrap(),
            QuantityRollback::KeepLocal
        );
        assert_eq!(
            "refetch".parse::<QuantityRollback>().unwrap(),
            QuantityRollback::Refetch
        );
        assert!("revert".parse::<QuantityRollback>().is_err());
    }

    #[test]
    fn test_default_options() {
        let options = CartOptions::default();
        assert_eq!(options.debounce, Duration::from_millis(60));
        assert_eq!(options.rollback, QuantityRollback::KeepLocal);
    }
}
