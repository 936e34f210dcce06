//! Test support for driving the client stack against a mock backend.
//!
//! Each harness owns a `wiremock` server standing in for the hosted
//! backend and a temp-dir client storage, so every test runs against an
//! isolated store instance.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wirecrest_core::{ProductId, UserId, UserRole};
use wirecrest_storefront::backend::CommerceClient;
use wirecrest_storefront::cart::{CartOptions, CartStore};
use wirecrest_storefront::session::StoredUser;
use wirecrest_storefront::storage::{ClientStorage, PendingUpdate, PendingUpdates, keys};

/// A mock backend plus isolated client storage.
pub struct TestHarness {
    pub server: MockServer,
    pub storage: ClientStorage,
    pub backend: CommerceClient,
    _data_dir: TempDir,
}

impl TestHarness {
    /// Start the mock server and open fresh storage.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let data_dir = TempDir::new().unwrap();
        let storage = ClientStorage::open(data_dir.path()).unwrap();
        let base_url = Url::parse(&server.uri()).unwrap();
        let backend = CommerceClient::new(&base_url);

        Self {
            server,
            storage,
            backend,
            _data_dir: data_dir,
        }
    }

    /// Persist an identity record, as a completed login would.
    pub fn login_as(&self, user_id: i32) {
        let user = StoredUser {
            id: UserId::new(user_id),
            first_name: "Test".into(),
            last_name: "User".into(),
            email: format!("user{user_id}@example.com"),
            role: UserRole::Customer,
            phone: None,
        };
        self.storage.set(keys::CURRENT_USER, &user).unwrap();
    }

    /// Connect a cart store with default options (60 ms debounce).
    pub async fn cart_store(&self) -> CartStore {
        self.cart_store_with(CartOptions::default()).await
    }

    /// Connect a cart store with explicit options.
    pub async fn cart_store_with(&self, options: CartOptions) -> CartStore {
        CartStore::connect(self.backend.clone(), self.storage.clone(), options).await
    }

    /// Mount a cart `fetch` responder returning the given line items.
    pub async fn mock_cart_fetch(&self, items: Value) {
        Mock::given(method("POST"))
            .and(path("/cart.php"))
            .and(body_partial_json(json!({"mode": "fetch"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.server)
            .await;
    }

    /// Mount a success responder for one cart mutation mode.
    pub async fn mock_cart_mutation_ok(&self, mode: &str) {
        Mock::given(method("POST"))
            .and(path("/cart.php"))
            .and(body_partial_json(json!({"mode": mode})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&self.server)
            .await;
    }

    /// Mount a backend-rejection responder for one cart mutation mode.
    pub async fn mock_cart_mutation_rejected(&self, mode: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path("/cart.php"))
            .and(body_partial_json(json!({"mode": mode})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "error", "message": message})),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a cart `fetch` responder that fails at the transport level.
    pub async fn mock_cart_fetch_error(&self) {
        Mock::given(method("POST"))
            .and(path("/cart.php"))
            .and(body_partial_json(json!({"mode": "fetch"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&self.server)
            .await;
    }

    /// The live pending-update marker for a user/product pair, if any.
    pub fn pending_marker(&self, user_id: i32, product_id: i32) -> Option<PendingUpdate> {
        PendingUpdates::for_user(self.storage.clone(), UserId::new(user_id))
            .get(ProductId::new(product_id))
    }

    /// Bodies of all received cart requests carrying the given mode.
    pub async fn cart_requests_with_mode(&self, mode: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == "/cart.php")
            .filter_map(|req| serde_json::from_slice::<Value>(&req.body).ok())
            .filter(|body| body["mode"] == mode)
            .collect()
    }

    /// Total number of requests the mock backend has seen.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

/// JSON for one cart line as the backend emits it (stringly numbers).
#[must_use]
pub fn line_json(id: i32, name: &str, price: &str, quantity: u32) -> Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "price": price,
        "quantity": quantity.to_string(),
        "image": format!("{id}.jpg"),
    })
}
