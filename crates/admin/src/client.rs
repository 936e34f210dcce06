//! HTTP client for the admin endpoints.
//!
//! Product writes go form-encoded/multipart (the backend reads `$_POST`
//! and `$_FILES` there); order and user management speak mode-tagged JSON
//! like the storefront cart endpoint.

use std::sync::Arc;

use reqwest::multipart;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use wirecrest_core::{OrderId, OrderStatus, ProductId, UserId, UserRole};

use crate::error::AdminError;
use crate::types::{
    AdminOrder, AdminOrderRequest, AdminUser, AdminUserRequest, Announcement, CatalogProduct,
    InventoryRow, NewProduct, ProductUpdate, SaleDetails, SaleDetailsResponse, SaleRow,
    SuccessAck,
};

const PRODUCTS: &str = "product.php";
const ORDERS: &str = "adminorders.php";
const USERS: &str = "adminusers.php";
const INVENTORY: &str = "inventory.php";
const SALES: &str = "sales.php";
const ANNOUNCEMENTS: &str = "post_announcement.php";

/// Client for the Wirecrest admin endpoints.
///
/// Cheaply cloneable; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    /// Create a new admin client for the given backend base URL.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                http: reqwest::Client::new(),
                base_url: base_url.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdminError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, AdminError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                endpoint = path,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "admin endpoint returned non-success status"
            );
            return Err(AdminError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                endpoint = path,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse admin response"
            );
            AdminError::Parse(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdminError> {
        let response = self.inner.http.get(self.endpoint(path)?).send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AdminError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    /// POST a `{success, message}` endpoint and fail on reported failure.
    async fn post_acked<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<String, AdminError> {
        let ack: SuccessAck = self.post_json(path, body).await?;
        if ack.success {
            Ok(ack.message.unwrap_or_else(|| format!("{what} succeeded")))
        } else {
            Err(AdminError::Rejected(
                ack.message.unwrap_or_else(|| format!("{what} failed")),
            ))
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List the full catalog (uncached - admins expect fresh stock counts).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<CatalogProduct>, AdminError> {
        self.get_json(PRODUCTS).await
    }

    /// Create a catalog product, uploading its image if provided.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<(), AdminError> {
        let mut form = multipart::Form::new()
            .text("name", product.name)
            .text("mrp", product.mrp.to_string())
            .text("price", product.price.to_string())
            .text("stock", product.stock.to_string())
            .text("offer", product.offer)
            .text("description", product.description);

        if let Some(image) = product.image {
            form = form.part(
                "image",
                multipart::Part::bytes(image.bytes).file_name(image.file_name),
            );
        }

        let response = self
            .inner
            .http
            .post(self.endpoint(PRODUCTS)?)
            .multipart(form)
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(PRODUCTS, response).await?;
        Ok(())
    }

    /// Update a catalog product, optionally replacing its image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(product_id = %update.id))]
    pub async fn update_product(&self, update: ProductUpdate) -> Result<(), AdminError> {
        let mut url = self.endpoint(PRODUCTS)?;
        url.query_pairs_mut().append_pair("action", "update");

        let mut form = multipart::Form::new()
            .text("id", update.id.to_string())
            .text("name", update.name)
            .text("mrp", update.mrp.to_string())
            .text("price", update.price.to_string())
            .text("stock", update.stock.to_string())
            .text("offer", update.offer)
            .text("description", update.description)
            .text("existingImage", update.existing_image.unwrap_or_default());

        if let Some(image) = update.new_image {
            form = form.part(
                "image",
                multipart::Part::bytes(image.bytes).file_name(image.file_name),
            );
        }

        let response = self.inner.http.post(url).multipart(form).send().await?;
        let _: serde_json::Value = Self::decode(PRODUCTS, response).await?;
        Ok(())
    }

    /// Delete a catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), AdminError> {
        let mut url = self.endpoint(PRODUCTS)?;
        url.query_pairs_mut()
            .append_pair("id", &product_id.to_string());

        let response = self
            .inner
            .http
            .delete(url)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(PRODUCTS, response).await?;
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List all orders across customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<AdminOrder>, AdminError> {
        self.get_json(ORDERS).await
    }

    /// Move an order to a new fulfillment status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<String, AdminError> {
        self.post_acked(
            ORDERS,
            &AdminOrderRequest::UpdateStatus {
                order_id: order_id.as_i32(),
                order_status: status,
            },
            "order status update",
        )
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<AdminUser>, AdminError> {
        self.get_json(USERS).await
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn update_user_role(
        &self,
        user_id: UserId,
        role: UserRole,
    ) -> Result<String, AdminError> {
        self.post_acked(
            USERS,
            &AdminUserRequest::UpdateRole {
                user_id: user_id.as_i32(),
                role,
            },
            "role update",
        )
        .await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: UserId) -> Result<String, AdminError> {
        self.post_acked(
            USERS,
            &AdminUserRequest::DeleteUser {
                user_id: user_id.as_i32(),
            },
            "user deletion",
        )
        .await
    }

    // =========================================================================
    // Inventory & reporting
    // =========================================================================

    /// Current stock levels.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<Vec<InventoryRow>, AdminError> {
        self.get_json(INVENTORY).await
    }

    /// The full sales ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn sales(&self) -> Result<Vec<SaleRow>, AdminError> {
        self.get_json(SALES).await
    }

    /// Line items of one order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Rejected`] when the backend reports the order
    /// unknown.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn sale_details(&self, order_id: &str) -> Result<SaleDetails, AdminError> {
        let mut url = self.endpoint(SALES)?;
        url.query_pairs_mut().append_pair("id", order_id);

        let response = self.inner.http.get(url).send().await?;
        match Self::decode(SALES, response).await? {
            SaleDetailsResponse::Details(details) => Ok(details),
            SaleDetailsResponse::Error { error } => Err(AdminError::Rejected(error)),
        }
    }

    // =========================================================================
    // Announcements
    // =========================================================================

    /// Post a storewide announcement; the backend emails subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, announcement), fields(title = %announcement.title))]
    pub async fn post_announcement(
        &self,
        announcement: &Announcement,
    ) -> Result<String, AdminError> {
        let value: serde_json::Value = self.post_json(ANNOUNCEMENTS, announcement).await?;
        Ok(value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("announcement posted")
            .to_string())
    }
}
