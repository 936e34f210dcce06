//! Lenient serde deserializers for the backend's loosely typed JSON.
//!
//! The hosted backend emits numeric fields as numbers or strings depending
//! on the endpoint revision. Every client crate deserializes through these
//! helpers so both shapes parse.

use serde::Deserialize;
use serde::de::{Deserializer, Error};

use crate::types::{OrderId, OrderStatus, ProductId, UserId};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNum {
    Num(i64),
    Text(String),
}

fn parse_i64<E: Error>(raw: RawNum) -> Result<i64, E> {
    match raw {
        RawNum::Num(n) => Ok(n),
        RawNum::Text(s) => s.trim().parse::<i64>().map_err(E::custom),
    }
}

/// Accept `7` or `"7"`.
pub fn i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let n = parse_i64(RawNum::deserialize(d)?)?;
    i32::try_from(n).map_err(D::Error::custom)
}

/// Accept `7` or `"7"`, rejecting negatives.
pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = parse_i64(RawNum::deserialize(d)?)?;
    u32::try_from(n).map_err(D::Error::custom)
}

/// Optional variant of [`i32`].
pub fn opt_i32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    let raw: Option<RawNum> = Option::deserialize(d)?;
    raw.map(|r| {
        let n = parse_i64::<D::Error>(r)?;
        i32::try_from(n).map_err(D::Error::custom)
    })
    .transpose()
}

/// Optional variant of [`u32`].
pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let raw: Option<RawNum> = Option::deserialize(d)?;
    raw.map(|r| {
        let n = parse_i64::<D::Error>(r)?;
        u32::try_from(n).map_err(D::Error::custom)
    })
    .transpose()
}

/// [`i32`] wrapped as a [`ProductId`].
pub fn product_id<'de, D: Deserializer<'de>>(d: D) -> Result<ProductId, D::Error> {
    i32(d).map(ProductId::new)
}

/// [`i32`] wrapped as an [`OrderId`].
pub fn order_id<'de, D: Deserializer<'de>>(d: D) -> Result<OrderId, D::Error> {
    i32(d).map(OrderId::new)
}

/// [`i32`] wrapped as a [`UserId`].
pub fn user_id<'de, D: Deserializer<'de>>(d: D) -> Result<UserId, D::Error> {
    i32(d).map(UserId::new)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Num(i64),
}

impl RawText {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Num(n) => n.to_string(),
        }
    }
}

/// Accept a string or number and keep it as a string (order references
/// such as `"ORD-2041"` or `2041`).
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(RawText::deserialize(d)?.into_string())
}

/// Optional variant of [`string`].
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw: Option<RawText> = Option::deserialize(d)?;
    Ok(raw.map(RawText::into_string))
}

/// Unknown statuses degrade to `pending` rather than failing the whole
/// response.
pub fn order_status<'de, D: Deserializer<'de>>(d: D) -> Result<OrderStatus, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.parse().unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use crate::types::{OrderStatus, ProductId};

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::product_id")]
        id: ProductId,
        #[serde(deserialize_with = "super::u32")]
        quantity: u32,
        #[serde(deserialize_with = "super::order_status")]
        status: OrderStatus,
    }

    #[test]
    fn test_accepts_both_shapes() {
        let a: Probe =
            serde_json::from_str(r#"{"id": "12", "quantity": 3, "status": "shipped"}"#).unwrap();
        assert_eq!(a.id, ProductId::new(12));
        assert_eq!(a.quantity, 3);
        assert_eq!(a.status, OrderStatus::Shipped);

        let b: Probe =
            serde_json::from_str(r#"{"id": 12, "quantity": "3", "status": "lost"}"#).unwrap();
        assert_eq!(b.id, ProductId::new(12));
        assert_eq!(b.status, OrderStatus::Pending);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(
            serde_json::from_str::<Probe>(r#"{"id": "x", "quantity": 1, "status": "pending"}"#)
                .is_err()
        );
        assert!(
            serde_json::from_str::<Probe>(r#"{"id": 1, "quantity": -2, "status": "pending"}"#)
                .is_err()
        );
    }
}
