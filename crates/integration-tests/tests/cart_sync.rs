//! Cart synchronization behavior against a mock backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;

use wirecrest_core::ProductId;
use wirecrest_integration_tests::{TestHarness, line_json};
use wirecrest_storefront::cart::{CartOptions, QuantityRollback};
use wirecrest_storefront::storage::keys;

/// Window long enough that a test can observe the pre-flush state without
/// racing the timer.
const SLOW_DEBOUNCE: Duration = Duration::from_millis(500);

fn slow_options() -> CartOptions {
    CartOptions {
        debounce: SLOW_DEBOUNCE,
        rollback: QuantityRollback::KeepLocal,
    }
}

#[tokio::test]
async fn fetch_twice_with_no_mutation_yields_same_items() {
    let h = TestHarness::start().await;
    h.login_as(1);
    h.mock_cart_fetch(json!([
        line_json(5, "Dome Camera", "1299.00", 2),
        line_json(9, "PoE Switch", "4999.00", 1),
    ]))
    .await;

    let store = h.cart_store().await;
    let first = store.state();
    assert!(first.loaded);
    assert_eq!(first.items.len(), 2);

    store.fetch_cart().await;
    let second = store.state();
    assert_eq!(second.items, first.items);
    store.shutdown();
}

#[tokio::test]
async fn unauthenticated_fetch_loads_empty_without_network() {
    let h = TestHarness::start().await;

    let store = h.cart_store().await;
    let state = store.state();
    assert!(state.loaded);
    assert!(state.items.is_empty());
    assert_eq!(h.request_count().await, 0);
    store.shutdown();
}

#[tokio::test]
async fn fetch_failure_still_marks_loaded_and_keeps_state() {
    let h = TestHarness::start().await;
    h.login_as(1);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 2)]))
        .await;

    let store = h.cart_store().await;
    assert_eq!(store.state().items.len(), 1);

    // Replace the responder with a server error; the next fetch fails but
    // the mirror keeps its last-known-good items.
    h.server.reset().await;
    h.mock_cart_fetch_error().await;

    store.fetch_cart().await;
    let state = store.state();
    assert!(state.loaded);
    assert_eq!(state.items.len(), 1);
    store.shutdown();
}

#[tokio::test]
async fn rapid_quantity_updates_coalesce_into_one_request() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 1)]))
        .await;
    h.mock_cart_mutation_ok("update").await;

    let store = h.cart_store().await;
    for quantity in [2_u32, 3, 4, 5] {
        store.update_quantity(ProductId::new(5), quantity);
    }

    // Let the 60 ms window elapse and the deferred write land.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let updates = h.cart_requests_with_mode("update").await;
    assert_eq!(updates.len(), 1, "burst must collapse into one write");
    assert_eq!(updates[0]["quantity"], 5);
    assert_eq!(updates[0]["product_id"], 5);
    store.shutdown();
}

#[tokio::test]
async fn quantity_update_is_optimistic_before_any_response() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 1)]))
        .await;
    h.mock_cart_mutation_ok("update").await;

    let store = h.cart_store_with(slow_options()).await;
    store.update_quantity(ProductId::new(5), 3);

    // Immediately visible locally, nothing sent yet.
    assert_eq!(store.state().quantity_of(ProductId::new(5)), Some(3));
    assert!(h.cart_requests_with_mode("update").await.is_empty());
    store.shutdown();
}

#[tokio::test]
async fn quantity_below_one_is_rejected_locally() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 2)]))
        .await;

    let store = h.cart_store_with(slow_options()).await;
    store.update_quantity(ProductId::new(5), 0);

    assert_eq!(store.state().quantity_of(ProductId::new(5)), Some(2));
    tokio::time::sleep(SLOW_DEBOUNCE + Duration::from_millis(100)).await;
    assert!(h.cart_requests_with_mode("update").await.is_empty());
    store.shutdown();
}

#[tokio::test]
async fn unauthenticated_add_returns_false_with_zero_requests() {
    let h = TestHarness::start().await;

    let store = h.cart_store().await;
    store.set_location("/products/7");

    assert!(!store.add_to_cart(ProductId::new(7)).await);
    assert_eq!(h.request_count().await, 0);

    // The current location was captured for the post-login redirect.
    let return_to: Option<String> = h.storage.get(keys::RETURN_URL);
    assert_eq!(return_to.as_deref(), Some("/products/7"));
    store.shutdown();
}

#[tokio::test]
async fn successful_add_resynchronizes_by_refetch() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_mutation_ok("add").await;
    h.mock_cart_fetch(json!([line_json(7, "Bullet Camera", "1599.00", 1)]))
        .await;

    let store = h.cart_store().await;
    assert!(store.add_to_cart(ProductId::new(7)).await);

    assert_eq!(store.state().quantity_of(ProductId::new(7)), Some(1));
    assert_eq!(h.cart_requests_with_mode("add").await.len(), 1);
    // connect + post-add reconciliation
    assert_eq!(h.cart_requests_with_mode("fetch").await.len(), 2);
    store.shutdown();
}

#[tokio::test]
async fn rejected_add_returns_false() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([])).await;
    h.mock_cart_mutation_rejected("add", "out of stock").await;

    let store = h.cart_store().await;
    assert!(!store.add_to_cart(ProductId::new(7)).await);
    store.shutdown();
}

#[tokio::test]
async fn repeated_adds_keep_one_line_per_product() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_mutation_ok("add").await;
    // The backend accumulates quantity on its side; the client only ever
    // mirrors what fetch returns.
    h.mock_cart_fetch(json!([line_json(7, "Bullet Camera", "1599.00", 3)]))
        .await;

    let store = h.cart_store().await;
    assert!(store.add_to_cart(ProductId::new(7)).await);
    assert!(store.add_to_cart(ProductId::new(7)).await);
    assert!(store.add_to_cart(ProductId::new(7)).await);

    let state = store.state();
    let lines_for_7 = state
        .items
        .iter()
        .filter(|item| item.id == ProductId::new(7))
        .count();
    assert_eq!(lines_for_7, 1);
    store.shutdown();
}

#[tokio::test]
async fn duplicate_rows_from_backend_are_deduplicated_on_ingest() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([
        line_json(7, "Bullet Camera", "1599.00", 2),
        line_json(7, "Bullet Camera", "1599.00", 9),
    ]))
    .await;

    let store = h.cart_store().await;
    let state = store.state();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.quantity_of(ProductId::new(7)), Some(2));
    store.shutdown();
}

#[tokio::test]
async fn removal_is_sent_immediately_and_cancels_pending_update() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 2)]))
        .await;
    h.mock_cart_mutation_ok("update").await;
    h.mock_cart_mutation_ok("delete").await;

    let store = h.cart_store_with(slow_options()).await;

    // A quantity change is pending inside its (long) debounce window...
    store.update_quantity(ProductId::new(5), 4);
    // ...when the user removes the line. The delete goes out now.
    store.remove_from_cart(ProductId::new(5)).await;

    assert_eq!(h.cart_requests_with_mode("delete").await.len(), 1);

    // Past the window: the superseded update never went out.
    tokio::time::sleep(SLOW_DEBOUNCE + Duration::from_millis(150)).await;
    assert!(h.cart_requests_with_mode("update").await.is_empty());
    store.shutdown();
}

#[tokio::test]
async fn confirmed_update_clears_pending_marker() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 1)]))
        .await;
    h.mock_cart_mutation_ok("update").await;

    let store = h.cart_store().await;
    store.update_quantity(ProductId::new(5), 2);

    // Marker is visible while the write is in flight.
    let marker = h.pending_marker(3, 5);
    assert_eq!(marker.map(|m| m.quantity), Some(2));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(h.pending_marker(3, 5).is_none());
    store.shutdown();
}

#[tokio::test]
async fn failed_update_keeps_marker_and_local_value() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 1)]))
        .await;
    h.mock_cart_mutation_rejected("update", "stock changed").await;

    let store = h.cart_store().await;
    store.update_quantity(ProductId::new(5), 4);
    tokio::time::sleep(Duration::from_millis(400)).await;

    // KeepLocal: the user's intended value survives the failure, and the
    // marker stays for the next reader (until its TTL).
    assert_eq!(store.state().quantity_of(ProductId::new(5)), Some(4));
    assert_eq!(h.pending_marker(3, 5).map(|m| m.quantity), Some(4));
    store.shutdown();
}

#[tokio::test]
async fn failed_update_with_refetch_policy_rolls_back() {
    let h = TestHarness::start().await;
    h.login_as(3);
    h.mock_cart_fetch(json!([line_json(5, "Dome Camera", "1299.00", 1)]))
        .await;
    h.mock_cart_mutation_rejected("update", "stock changed").await;

    let store = h
        .cart_store_with(CartOptions {
            debounce: Duration::from_millis(60),
            rollback: QuantityRollback::Refetch,
        })
        .await;
    store.update_quantity(ProductId::new(5), 4);
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Refetch healed the line back to the backend's value.
    assert_eq!(store.state().quantity_of(ProductId::new(5)), Some(1));
    store.shutdown();
}
