//! Client-side aggregation for the sales report screen.
//!
//! The backend hands back a flat ledger of per-order revenue rows; the
//! report view groups them by day and totals them. Rows without a parsable
//! date group under `None`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::SaleRow;

/// Revenue totaled for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySales {
    pub date: Option<NaiveDate>,
    pub total: Decimal,
    pub order_count: usize,
}

/// Parse a ledger date (`YYYY-MM-DD`, possibly with a time suffix).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Group ledger rows by day, ascending, dateless rows first.
#[must_use]
pub fn group_by_day(rows: &[SaleRow]) -> Vec<DailySales> {
    let mut days: BTreeMap<Option<NaiveDate>, (Decimal, usize)> = BTreeMap::new();
    for row in rows {
        let date = row.date.as_deref().and_then(parse_date);
        let entry = days.entry(date).or_insert((Decimal::ZERO, 0));
        entry.0 += row.sales;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(date, (total, order_count))| DailySales {
            date,
            total,
            order_count,
        })
        .collect()
}

/// Total revenue across the ledger.
#[must_use]
pub fn total_sales(rows: &[SaleRow]) -> Decimal {
    rows.iter().map(|row| row.sales).sum()
}

/// Number of distinct orders in the ledger.
#[must_use]
pub fn unique_order_count(rows: &[SaleRow]) -> usize {
    let mut seen: Vec<&str> = rows.iter().map(|row| row.order_id.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(order_id: &str, date: Option<&str>, sales: i64) -> SaleRow {
        serde_json::from_value(serde_json::json!({
            "order_id": order_id,
            "date": date,
            "sales": Decimal::new(sales, 2),
        }))
        .unwrap()
    }

    #[test]
    fn test_group_by_day() {
        let rows = vec![
            row("1", Some("2026-03-14"), 10_000),
            row("2", Some("2026-03-14 09:30:00"), 5_000),
            row("3", Some("2026-03-15"), 2_500),
        ];
        let days = group_by_day(&rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].total, Decimal::new(15_000, 2));
        assert_eq!(days[0].order_count, 2);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 3, 15));
    }

    #[test]
    fn test_dateless_rows_group_separately() {
        let rows = vec![row("1", None, 100), row("2", Some("garbage"), 200)];
        let days = group_by_day(&rows);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, None);
        assert_eq!(days[0].order_count, 2);
    }

    #[test]
    fn test_totals() {
        let rows = vec![
            row("1", Some("2026-03-14"), 10_000),
            row("1", Some("2026-03-14"), 5_000),
            row("2", Some("2026-03-15"), 2_500),
        ];
        assert_eq!(total_sales(&rows), Decimal::new(17_500, 2));
        assert_eq!(unique_order_count(&rows), 2);
    }
}
