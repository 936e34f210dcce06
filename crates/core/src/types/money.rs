//! Money helpers for backend-authoritative prices.
//!
//! Prices arrive from the backend as decimal rupee amounts (GST already
//! included) and are never recomputed client-side beyond line and cart
//! totals. `rust_decimal` keeps the arithmetic exact; `f64` is never used
//! for money.

use rust_decimal::Decimal;

/// Format a rupee amount for display, e.g. `₹1,234.50` without grouping:
/// `₹1234.50`.
///
/// The backend emits plain decimal strings; display formatting is the only
/// place a currency symbol is attached.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    format!("\u{20b9}{:.2}", amount.round_dp(2))
}

/// Total for a single cart line: unit price times quantity.
#[must_use]
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(Decimal::new(129900, 2)), "₹1299.00");
        assert_eq!(format_inr(Decimal::new(405, 1)), "₹40.50");
        assert_eq!(format_inr(Decimal::ZERO), "₹0.00");
    }

    #[test]
    fn test_line_total() {
        let price = Decimal::new(10000, 2); // 100.00
        assert_eq!(line_total(price, 3), Decimal::new(30000, 2));
    }

    #[test]
    fn test_line_total_is_exact() {
        // 0.1 * 3 must be exactly 0.3, not a float approximation
        let price = Decimal::new(1, 1);
        assert_eq!(line_total(price, 3), Decimal::new(3, 1));
    }
}
