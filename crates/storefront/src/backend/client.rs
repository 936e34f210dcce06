//! HTTP client for the commerce backend.
//!
//! Uses `reqwest` with JSON bodies for the RPC-style endpoints and form
//! encoding where the backend expects it. Catalog responses are cached
//! using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use wirecrest_core::{ProductId, UserId};

use super::BackendError;
use super::types::{
    CartLineItem, CartRequest, ContactMessage, DashboardSummary, LoginResponse, MutationAck,
    Order, OrderReceipt, OrderReceiptEnvelope, OrderRequest, OrdersResponse,
    PasswordResetRequest, Product, ProfileData, ProfileEnvelope, ProfileRequest, ProfileUpdate,
    RegisterRequest, SuccessAck,
};

// Endpoint paths on the hosted backend. The password-reset spelling is the
// backend's, typo included.
const CART: &str = "cart.php";
const PRODUCTS: &str = "product.php";
const ORDERS: &str = "orders.php";
const ORDER_HISTORY: &str = "fetch_orders.php";
const DASHBOARD: &str = "dashboard.php";
const PROFILE: &str = "profile.php";
const LOGIN: &str = "login.php";
const REGISTER: &str = "register.php";
const PASSWORD_RESET: &str = "forgot-pasword.php";
const SUBSCRIBE: &str = "subscribe.php";
const CONTACT: &str = "contact.php";

const CATALOG_CACHE_KEY: &str = "products";

/// Cached catalog values.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the Wirecrest commerce backend.
///
/// Cheaply cloneable; all clones share one HTTP connection pool and one
/// catalog cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    http: reqwest::Client,
    base_url: Url,
    catalog_cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new backend client for the given base URL.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        let catalog_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.clone(),
                catalog_cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .http
            .post(self.endpoint(path)?)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    /// GET an endpoint and decode a JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.inner.http.get(self.endpoint(path)?).send().await?;
        Self::decode(path, response).await
    }

    /// Read the body as text first so a parse failure can be diagnosed.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                endpoint = path,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(BackendError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                endpoint = path,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Issue a cart mutation and fail on a backend-reported rejection.
    async fn cart_mutation(&self, request: CartRequest) -> Result<(), BackendError> {
        let ack: MutationAck = self.post_json(CART, &request).await?;
        if ack.is_success() {
            Ok(())
        } else {
            Err(BackendError::Rejected(ack.reason()))
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the full line-item collection for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not the
    /// documented bare array.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_cart(&self, user_id: UserId) -> Result<Vec<CartLineItem>, BackendError> {
        let request = CartRequest::Fetch {
            user_id: user_id.as_i32(),
        };
        let value: serde_json::Value = self.post_json(CART, &request).await?;

        if value.is_array() {
            Ok(serde_json::from_value(value)?)
        } else {
            Err(BackendError::UnexpectedShape(
                "cart fetch did not return an array".to_string(),
            ))
        }
    }

    /// Insert a line item, or increment its quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.cart_mutation(CartRequest::Add {
            user_id: user_id.as_i32(),
            product_id: product_id.as_i32(),
            quantity,
        })
        .await
    }

    /// Set the absolute quantity of a line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_cart_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        self.cart_mutation(CartRequest::Update {
            user_id: user_id.as_i32(),
            product_id: product_id.as_i32(),
            quantity,
        })
        .await
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), BackendError> {
        self.cart_mutation(CartRequest::Delete {
            user_id: user_id.as_i32(),
            product_id: product_id.as_i32(),
        })
        .await
    }

    // =========================================================================
    // Catalog (cached - read-only state)
    // =========================================================================

    /// Get the product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await
        {
            debug!("cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(PRODUCTS).await?;

        self.inner
            .catalog_cache
            .insert(
                CATALOG_CACHE_KEY.to_string(),
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// The backend has no single-product read; this goes through the cached
    /// catalog list.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no product has the given id.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Product, BackendError> {
        self.products()
            .await?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| BackendError::NotFound(format!("product {product_id}")))
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog_cache(&self) {
        self.inner.catalog_cache.invalidate_all();
        self.inner.catalog_cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the
    /// order.
    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderReceipt, BackendError> {
        let envelope: OrderReceiptEnvelope = self.post_json(ORDERS, request).await?;

        if envelope.status != "success" {
            return Err(BackendError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| format!("status: {}", envelope.status)),
            ));
        }

        let order_id = envelope.order_id.ok_or_else(|| {
            BackendError::UnexpectedShape("order confirmation without order_id".to_string())
        })?;

        Ok(OrderReceipt {
            order_id,
            order_date: envelope.order_date,
        })
    }

    /// Fetch the order history for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn orders(&self, user_id: UserId) -> Result<Vec<Order>, BackendError> {
        let response: OrdersResponse = self
            .post_json(ORDER_HISTORY, &json!({ "user_id": user_id.as_i32() }))
            .await?;
        Ok(response.into_orders())
    }

    /// Fetch the account dashboard: profile on record plus recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn dashboard(
        &self,
        user_id: UserId,
        recent_limit: u32,
    ) -> Result<DashboardSummary, BackendError> {
        self.post_json(
            DASHBOARD,
            &json!({ "user_id": user_id.as_i32(), "limit": recent_limit }),
        )
        .await
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Authenticate and return the identity record on success.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] on invalid credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<crate::session::StoredUser, BackendError> {
        let response: LoginResponse = self
            .post_json(
                LOGIN,
                &json!({ "email": email, "password": password.expose_secret() }),
            )
            .await?;

        let message = response.message.clone();
        response.into_user().ok_or_else(|| {
            BackendError::Rejected(message.unwrap_or_else(|| "invalid credentials".to_string()))
        })
    }

    /// Create an account. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, BackendError> {
        let ack: SuccessAck = self.post_json(REGISTER, request).await?;
        Ok(ack.message.unwrap_or_else(|| "registered".to_string()))
    }

    /// Drive one step of the OTP-based password-reset flow.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] when the backend refuses the step
    /// (wrong OTP, unknown email).
    #[instrument(skip(self, request))]
    pub async fn password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<String, BackendError> {
        let ack: SuccessAck = self.post_json(PASSWORD_RESET, request).await?;
        if ack.success {
            Ok(ack.message.unwrap_or_default())
        } else {
            Err(BackendError::Rejected(
                ack.message.unwrap_or_else(|| "password reset failed".to_string()),
            ))
        }
    }

    /// Fetch the profile fields on record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn profile(&self, user_id: UserId) -> Result<ProfileData, BackendError> {
        let envelope: ProfileEnvelope = self
            .post_json(
                PROFILE,
                &ProfileRequest::Fetch {
                    user_id: user_id.as_i32(),
                },
            )
            .await?;

        if envelope.success {
            envelope.data.ok_or_else(|| {
                BackendError::UnexpectedShape("profile response without data".to_string())
            })
        } else {
            Err(BackendError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "profile fetch failed".to_string()),
            ))
        }
    }

    /// Update profile fields. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<String, BackendError> {
        let ack: SuccessAck = self
            .post_json(
                PROFILE,
                &ProfileRequest::Update {
                    user_id: user_id.as_i32(),
                    first_name: update.first_name,
                    last_name: update.last_name,
                    password: update.password,
                },
            )
            .await?;

        if ack.success {
            Ok(ack.message.unwrap_or_else(|| "profile updated".to_string()))
        } else {
            Err(BackendError::Rejected(
                ack.message.unwrap_or_else(|| "profile update failed".to_string()),
            ))
        }
    }

    // =========================================================================
    // Marketing
    // =========================================================================

    /// Subscribe an email address to the newsletter (form-encoded).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(SUBSCRIBE)?)
            .form(&[("email", email)])
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(SUBSCRIBE, response).await?;
        Ok(())
    }

    /// Send a contact-form message (form-encoded).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, message), fields(email = %message.email))]
    pub async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), BackendError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(CONTACT)?)
            .form(message)
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(CONTACT, response).await?;
        Ok(())
    }
}
