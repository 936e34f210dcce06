//! Catalog listing helpers.
//!
//! The listing surface fetches the whole catalog (cached in the backend
//! client) and refines it client-side: name-substring search and price
//! sorting, matching what the backend offers - which is nothing.

use crate::backend::Product;

/// Sort order for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    PriceLowToHigh,
    PriceHighToLow,
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" | "price-asc" => Ok(Self::PriceLowToHigh),
            "high" | "price-desc" => Ok(Self::PriceHighToLow),
            other => Err(format!("unknown sort '{other}' (expected 'low' or 'high')")),
        }
    }
}

/// Case-insensitive name filter plus optional price sort.
#[must_use]
pub fn filter_and_sort(
    mut products: Vec<Product>,
    search: Option<&str>,
    sort: Option<ProductSort>,
) -> Vec<Product> {
    if let Some(needle) = search {
        let needle = needle.to_lowercase();
        products.retain(|p| p.name.to_lowercase().contains(&needle));
    }

    match sort {
        Some(ProductSort::PriceLowToHigh) => products.sort_by_key(|p| p.price),
        Some(ProductSort::PriceHighToLow) => {
            products.sort_by_key(|p| std::cmp::Reverse(p.price));
        }
        None => {}
    }

    products
}

/// Whether a product can currently be added to a cart.
#[must_use]
pub fn in_stock(product: &Product) -> bool {
    product.stock.is_none_or(|stock| stock > 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use wirecrest_core::ProductId;

    fn product(id: i32, name: &str, price: i64, stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            mrp: None,
            price: Decimal::new(price, 2),
            stock,
            offer: None,
            description: String::new(),
            image: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, "PoE Switch 8-port", 499_900, Some(4)),
            product(2, "Dome Camera", 129_900, Some(0)),
            product(3, "Bullet Camera", 159_900, None),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let found = filter_and_sort(sample(), Some("camera"), None);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_sort_low_to_high() {
        let sorted = filter_and_sort(sample(), None, Some(ProductSort::PriceLowToHigh));
        assert_eq!(sorted[0].id, ProductId::new(2));
        assert_eq!(sorted[2].id, ProductId::new(1));
    }

    #[test]
    fn test_sort_high_to_low() {
        let sorted = filter_and_sort(sample(), None, Some(ProductSort::PriceHighToLow));
        assert_eq!(sorted[0].id, ProductId::new(1));
    }

    #[test]
    fn test_in_stock() {
        let items = sample();
        assert!(in_stock(&items[0]));
        assert!(!in_stock(&items[1]));
        // Unknown stock is treated as available; the backend enforces it.
        assert!(in_stock(&items[2]));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("low".parse::<ProductSort>().unwrap(), ProductSort::PriceLowToHigh);
        assert!("alphabetical".parse::<ProductSort>().is_err());
    }
}
