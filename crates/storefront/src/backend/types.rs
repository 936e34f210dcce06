//! Wire types for the commerce backend.
//!
//! The backend serves JSON with loose typing: numeric fields arrive as
//! numbers or strings depending on the endpoint revision, and list
//! responses are sometimes wrapped in an envelope. Field deserialization
//! goes through [`wirecrest_core::de`] so every shape the backend is known
//! to produce parses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wirecrest_core::de as lenient;
use wirecrest_core::{OrderStatus, PaymentMode, ProductId, UserId, UserRole};

// =============================================================================
// Cart
// =============================================================================

/// Request union for the single cart endpoint.
///
/// The backend multiplexes all cart operations through one URL, dispatching
/// on a `mode` field in the request body.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CartRequest {
    /// Return the full line-item collection for a user.
    Fetch { user_id: i32 },
    /// Insert a line item, or increment its quantity if already present.
    Add {
        user_id: i32,
        product_id: i32,
        quantity: u32,
    },
    /// Set the absolute quantity of a line item.
    Update {
        user_id: i32,
        product_id: i32,
        quantity: u32,
    },
    /// Remove a line item.
    Delete { user_id: i32, product_id: i32 },
}

/// One product entry in the cart.
///
/// `price` is backend-authoritative at fetch time (GST-inclusive rupees);
/// `name` and `image` are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(deserialize_with = "lenient::product_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Decimal,
    #[serde(deserialize_with = "lenient::u32")]
    pub quantity: u32,
}

/// Acknowledgement envelope for mutation calls.
///
/// Any `status` other than `"success"` is a backend-reported business
/// failure; `message` carries the human-readable reason when present.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl MutationAck {
    /// Whether the backend confirmed the mutation.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// The failure reason, or a placeholder when the backend gave none.
    #[must_use]
    pub fn reason(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("status: {}", self.status))
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product as served by the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "lenient::product_id")]
    pub id: ProductId,
    pub name: String,
    /// Maximum retail price, shown struck through next to `price`.
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

// =============================================================================
// Orders
// =============================================================================

/// Order placement request body.
///
/// Field names follow the backend contract, which mixes snake_case and
/// camelCase between the envelope and the shipping form.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub user_id: i32,
    #[serde(rename = "cartItems")]
    pub cart_items: Vec<CartLineItem>,
    #[serde(rename = "formData")]
    pub form_data: OrderFormData,
}

/// Shipping and payment form fields for an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderFormData {
    pub name: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub pincode: String,
    #[serde(rename = "paymentMode")]
    pub payment_mode: PaymentMode,
}

/// Confirmation returned by a successful order placement.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
    #[serde(deserialize_with = "lenient::string")]
    pub order_id: String,
    #[serde(default)]
    pub order_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderReceiptEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_date: Option<String>,
}

/// One line of a past order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    pub price: Decimal,
    #[serde(deserialize_with = "lenient::u32")]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// A past order with its shipping snapshot and line items.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "lenient::order_id")]
    pub order_id: wirecrest_core::OrderId,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::order_status")]
    pub order_status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order-history responses arrive either as a bare array or wrapped in an
/// `{orders: [...]}` envelope depending on the backend revision.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrdersResponse {
    Bare(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

impl OrdersResponse {
    pub fn into_orders(self) -> Vec<Order> {
        match self {
            Self::Bare(orders) | Self::Wrapped { orders } => orders,
        }
    }
}

/// Account-dashboard summary: the profile on record plus recent orders.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub user: Option<ProfileData>,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}

// =============================================================================
// Account
// =============================================================================

/// Profile fields as stored by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ProfileData>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic `{success, message}` acknowledgement used by the account
/// endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SuccessAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Login response. Current backend revisions return a `user` object;
/// older ones return the identity fields at the top level.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<crate::session::StoredUser>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i32")]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl LoginResponse {
    /// Collapse the two response shapes into an identity record, if the
    /// login succeeded.
    pub fn into_user(self) -> Option<crate::session::StoredUser> {
        if let Some(user) = self.user {
            return Some(user);
        }
        if !self.success {
            return None;
        }
        let id = UserId::new(self.user_id?);
        Some(crate::session::StoredUser {
            id,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            phone: None,
        })
    }
}

/// Request union for the profile endpoint (mode-tagged like the cart).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub(crate) enum ProfileRequest {
    Fetch {
        user_id: i32,
    },
    Update {
        user_id: i32,
        first_name: String,
        last_name: String,
        /// Only sent when the user chose a new password.
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
}

/// Profile fields a user may change.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub password: Option<String>,
}

/// Contact-form message, submitted form-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Registration request body. The backend expects the role spelled out.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: &'static str,
}

/// Password-recovery request union (mode-tagged like the cart endpoint).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PasswordResetRequest {
    RequestOtp { email: String },
    ResendOtp { email: String },
    VerifyOtp { email: String, otp: String },
    ResetPassword {
        email: String,
        otp: String,
        password: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_request_mode_tagging() {
        let req = CartRequest::Update {
            user_id: 3,
            product_id: 5,
            quantity: 4,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "update");
        assert_eq!(value["user_id"], 3);
        assert_eq!(value["product_id"], 5);
        assert_eq!(value["quantity"], 4);
    }

    #[test]
    fn test_cart_request_delete_has_no_quantity() {
        let req = CartRequest::Delete {
            user_id: 1,
            product_id: 9,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "delete");
        assert!(value.get("quantity").is_none());
    }

    #[test]
    fn test_cart_line_item_accepts_stringly_numbers() {
        let item: CartLineItem = serde_json::from_str(
            r#"{"id": "12", "name": "8-port PoE switch", "price": "4999.00", "quantity": "2", "image": "switch.jpg"}"#,
        )
        .unwrap();
        assert_eq!(item.id, ProductId::new(12));
        assert_eq!(item.price, Decimal::new(499_900, 2));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_cart_line_item_accepts_plain_numbers() {
        let item: CartLineItem = serde_json::from_str(
            r#"{"id": 12, "name": "Dome camera", "price": 1299.5, "quantity": 1}"#,
        )
        .unwrap();
        assert_eq!(item.id, ProductId::new(12));
        assert_eq!(item.quantity, 1);
        assert!(item.image.is_none());
    }

    #[test]
    fn test_mutation_ack() {
        let ack: MutationAck = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(ack.is_success());

        let ack: MutationAck =
            serde_json::from_str(r#"{"status": "error", "message": "out of stock"}"#).unwrap();
        assert!(!ack.is_success());
        assert_eq!(ack.reason(), "out of stock");
    }

    #[test]
    fn test_orders_response_both_shapes() {
        let bare: OrdersResponse = serde_json::from_str(
            r#"[{"order_id": 1, "total_amount": "100.00", "order_status": "pending"}]"#,
        )
        .unwrap();
        assert_eq!(bare.into_orders().len(), 1);

        let wrapped: OrdersResponse = serde_json::from_str(
            r#"{"orders": [{"order_id": "2", "total_amount": 50, "order_status": "shipped"}]}"#,
        )
        .unwrap();
        let orders = wrapped.into_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_status, OrderStatus::Shipped);
    }

    #[test]
    fn test_unknown_order_status_degrades_to_pending() {
        let order: Order = serde_json::from_str(
            r#"{"order_id": 7, "total_amount": "10.00", "order_status": "misplaced"}"#,
        )
        .unwrap();
        assert_eq!(order.order_status, OrderStatus::Pending);
    }

    #[test]
    fn test_login_response_flat_shape() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"success": true, "user_id": "4", "first_name": "Asha", "email": "asha@example.com", "role": "admin"}"#,
        )
        .unwrap();
        let user = resp.into_user().unwrap();
        assert_eq!(user.id, UserId::new(4));
        assert!(user.role.is_admin());
    }

    #[test]
    fn test_login_response_failure() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"success": false, "message": "bad password"}"#).unwrap();
        assert!(resp.into_user().is_none());
    }

    #[test]
    fn test_password_reset_request_modes() {
        let req = PasswordResetRequest::VerifyOtp {
            email: "a@b.in".into(),
            otp: "123456".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "verify_otp");
        assert_eq!(value["otp"], "123456");
    }

    #[test]
    fn test_order_form_data_wire_names() {
        let form = OrderFormData {
            name: "R. Mehta".into(),
            phone: "9000000000".into(),
            address1: "14 MG Road".into(),
            address2: String::new(),
            city: "Pune".into(),
            pincode: "411001".into(),
            payment_mode: PaymentMode::Cod,
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["paymentMode"], "cod");
        assert_eq!(value["pincode"], "411001");
    }

}
