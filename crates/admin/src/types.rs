//! Wire types for the admin endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wirecrest_core::de as lenient;
use wirecrest_core::{OrderId, OrderStatus, ProductId, UserId, UserRole};

// =============================================================================
// Products
// =============================================================================

/// A catalog row as the admin product screen sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    #[serde(deserialize_with = "lenient::product_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub mrp: Option<Decimal>,
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub stock: Option<u32>,
    #[serde(default)]
    pub offer: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields for a new catalog product. The image travels as a multipart file
/// part alongside these.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    /// Maximum retail price, shown struck through next to the sale price.
    pub mrp: Decimal,
    pub price: Decimal,
    pub stock: u32,
    /// Free-form offer tag, e.g. `"10% off"`.
    pub offer: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

/// Changes to an existing product. `existing_image` keeps the current
/// image when no new one is uploaded.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub id: ProductId,
    pub name: String,
    pub mrp: Decimal,
    pub price: Decimal,
    pub stock: u32,
    pub offer: String,
    pub description: String,
    pub existing_image: Option<String>,
    pub new_image: Option<ImageUpload>,
}

/// An image file to upload with a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name the backend stores under `uploads/`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Orders
// =============================================================================

/// Request union for the admin order endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdminOrderRequest {
    UpdateStatus {
        order_id: i32,
        order_status: OrderStatus,
    },
}

/// An order as listed on the admin order screen.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminOrder {
    #[serde(deserialize_with = "lenient::order_id")]
    pub order_id: OrderId,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::order_status")]
    pub order_status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// Request union for the admin user endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdminUserRequest {
    UpdateRole { user_id: i32, role: UserRole },
    DeleteUser { user_id: i32 },
}

/// An account as listed on the admin user screen.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
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
}

// =============================================================================
// Inventory & reporting
// =============================================================================

/// A stock level row.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryRow {
    #[serde(deserialize_with = "lenient::product_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient::u32")]
    pub stock: u32,
}

/// One sales-ledger row: a line of revenue attributed to an order on a day.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRow {
    #[serde(deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub sales: Decimal,
}

/// Line items of one order, fetched for the order-detail screen.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleDetails {
    #[serde(deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

/// One line of a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleItem {
    pub product_name: String,
    pub price: Decimal,
    #[serde(deserialize_with = "lenient::u32")]
    pub quantity: u32,
}

/// Either the detail payload or the backend's `{error}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SaleDetailsResponse {
    Error { error: String },
    Details(SaleDetails),
}

// =============================================================================
// Announcements
// =============================================================================

/// A storewide announcement, emailed to subscribers by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    pub title: String,
    pub content: String,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SuccessAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_mode_tagging() {
        let req = AdminOrderRequest::UpdateStatus {
            order_id: 12,
            order_status: OrderStatus::Shipped,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "update_status");
        assert_eq!(value["order_status"], "shipped");
    }

    #[test]
    fn test_user_request_mode_tagging() {
        let req = AdminUserRequest::DeleteUser { user_id: 4 };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "delete_user");

        let req = AdminUserRequest::UpdateRole {
            user_id: 4,
            role: UserRole::Admin,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "update_role");
        assert_eq!(value["role"], "admin");
    }

    #[test]
    fn test_sale_row_accepts_stringly_fields() {
        let row: SaleRow = serde_json::from_str(
            r#"{"order_id": 2041, "date": "2026-03-14", "sales": "1299.00"}"#,
        )
        .unwrap();
        assert_eq!(row.order_id, "2041");
        assert_eq!(row.sales, Decimal::new(129_900, 2));
    }

    #[test]
    fn test_sale_details_error_envelope() {
        let resp: SaleDetailsResponse =
            serde_json::from_str(r#"{"error": "Order not found"}"#).unwrap();
        assert!(matches!(resp, SaleDetailsResponse::Error { .. }));
    }
}
