//! Checkout: order summary math, shipping form, and order placement.
//!
//! Prices from the backend are GST-inclusive, so tax is displayed as a
//! share of the subtotal rather than added on top. Shipping is free above a
//! flat threshold; below it a fixed fee applies. The grand total is the
//! subtotal plus shipping.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use wirecrest_core::{PaymentMode, line_total};

use crate::backend::{
    BackendError, CartLineItem, CommerceClient, OrderFormData, OrderReceipt, OrderRequest,
};
use crate::session::Session;

/// GST share of a GST-inclusive price (18%).
fn gst_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Orders at or above this subtotal ship free.
fn free_shipping_threshold() -> Decimal {
    Decimal::from(299)
}

/// Flat shipping fee below the threshold.
fn shipping_fee() -> Decimal {
    Decimal::from(40)
}

/// Errors that can occur placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Order placement requires a logged-in user.
    #[error("not logged in")]
    NotAuthenticated,

    /// The cart has no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// A required shipping field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The backend refused or the request failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Order cost breakdown shown on the cart and checkout surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Sum of line totals, GST included.
    pub subtotal: Decimal,
    /// GST share of the subtotal (informational - already included).
    pub tax: Decimal,
    /// Subtotal with the GST share taken out.
    pub subtotal_before_tax: Decimal,
    /// Flat fee, zero at or above the free-shipping threshold.
    pub shipping: Decimal,
    /// Subtotal plus shipping.
    pub grand_total: Decimal,
}

impl CheckoutSummary {
    /// Compute the breakdown for a set of line items.
    #[must_use]
    pub fn from_items(items: &[CartLineItem]) -> Self {
        let subtotal: Decimal = items
            .iter()
            .map(|item| line_total(item.price, item.quantity))
            .sum();
        let tax = (subtotal * gst_rate()).round_dp(2);
        let shipping = if subtotal >= free_shipping_threshold() {
            Decimal::ZERO
        } else {
            shipping_fee()
        };

        Self {
            subtotal,
            tax,
            subtotal_before_tax: subtotal - tax,
            shipping,
            grand_total: subtotal + shipping,
        }
    }

    /// Whether the order qualified for free shipping.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Shipping and payment details collected at checkout.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    pub name: String,
    pub phone: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub pincode: String,
    pub payment_mode: PaymentMode,
}

impl ShippingDetails {
    /// Check that every required field is filled in. `address2` is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        for (value, field) in [
            (&self.name, "name"),
            (&self.address1, "address1"),
            (&self.city, "city"),
            (&self.pincode, "pincode"),
            (&self.phone, "phone"),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// Validate and place an order for the current cart contents.
///
/// The cart itself is not mutated here; the backend clears it as part of
/// order processing and the next fetch reflects that.
///
/// # Errors
///
/// Returns an error if the session is absent, the cart is empty, a
/// required field is blank, or the backend rejects the order.
#[instrument(skip(backend, items, details), fields(lines = items.len()))]
pub async fn place_order(
    backend: &CommerceClient,
    session: Session,
    items: &[CartLineItem],
    details: &ShippingDetails,
) -> Result<OrderReceipt, CheckoutError> {
    let Some(user_id) = session.user_id else {
        return Err(CheckoutError::NotAuthenticated);
    };
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    details.validate()?;

    let request = OrderRequest {
        user_id: user_id.as_i32(),
        cart_items: items.to_vec(),
        form_data: OrderFormData {
            name: details.name.clone(),
            phone: details.phone.clone(),
            address1: details.address1.clone(),
            address2: details.address2.clone(),
            city: details.city.clone(),
            pincode: details.pincode.clone(),
            payment_mode: details.payment_mode,
        },
    };

    Ok(backend.place_order(&request).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wirecrest_core::ProductId;

    fn line(id: i32, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("product {id}"),
            image: None,
            price,
            quantity,
        }
    }

    fn details() -> ShippingDetails {
        ShippingDetails {
            name: "R. Mehta".into(),
            phone: "9000000000".into(),
            address1: "14 MG Road".into(),
            address2: String::new(),
            city: "Pune".into(),
            pincode: "411001".into(),
            payment_mode: PaymentMode::Cod,
        }
    }

    #[test]
    fn test_summary_below_free_shipping_threshold() {
        // 2 x 100.00 + 1 x 50.00 = 250.00 subtotal
        let items = vec![
            line(1, Decimal::new(10_000, 2), 2),
            line(2, Decimal::new(5_000, 2), 1),
        ];
        let summary = CheckoutSummary::from_items(&items);

        assert_eq!(summary.subtotal, Decimal::new(25_000, 2));
        assert_eq!(summary.tax, Decimal::new(4_500, 2)); // 18% of 250.00
        assert_eq!(summary.subtotal_before_tax, Decimal::new(20_500, 2));
        assert_eq!(summary.shipping, Decimal::from(40));
        assert_eq!(summary.grand_total, Decimal::new(29_000, 2)); // 290.00
        assert!(!summary.free_shipping());
    }

    #[test]
    fn test_summary_at_free_shipping_threshold() {
        let items = vec![line(1, Decimal::from(299), 1)];
        let summary = CheckoutSummary::from_items(&items);
        assert!(summary.free_shipping());
        assert_eq!(summary.grand_total, Decimal::from(299));
    }

    #[test]
    fn test_summary_empty_cart() {
        let summary = CheckoutSummary::from_items(&[]);
        assert_eq!(summary.subtotal, Decimal::ZERO);
        // An empty cart never checks out, but the math stays consistent.
        assert_eq!(summary.grand_total, Decimal::from(40));
    }

    #[test]
    fn test_validate_catches_blank_fields() {
        let mut d = details();
        assert!(d.validate().is_ok());

        d.city = "  ".into();
        match d.validate() {
            Err(CheckoutError::MissingField(field)) => assert_eq!(field, "city"),
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_address2_is_optional() {
        let d = details();
        assert!(d.address2.is_empty());
        assert!(d.validate().is_ok());
    }
}
