//! # Table Listing
//!
//! Filtering, sorting and banner totals for the product tables.
//!
//! ## Sold Products Pipeline
//! ```text
//! rows ──► search (name | category | customer) ──► status ──► branch ──► category
//!                                                                          │
//!                           total_profit ◄── sort (date | status | remaining)
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentStatus, RestoredProduct, SoldProduct, StoreProduct};

// =============================================================================
// Sold Products
// =============================================================================

/// Filters applied to the sold-products table. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SoldFilter {
    #[serde(default)]
    pub search: String,
    pub status: Option<PaymentStatus>,
    pub branch: Option<String>,
    pub category: Option<String>,
}

impl SoldFilter {
    pub fn matches(&self, row: &SoldProduct) -> bool {
        let needle = self.search.trim().to_lowercase();
        let search_hit = needle.is_empty()
            || row.product_name.to_lowercase().contains(&needle)
            || row.category.to_lowercase().contains(&needle)
            || row
                .customer_name
                .as_deref()
                .map(|c| c.to_lowercase().contains(&needle))
                .unwrap_or(false);

        search_hit
            && self.status.map(|s| s == row.payment_status).unwrap_or(true)
            && self.branch.as_deref().map(|b| b == row.branch).unwrap_or(true)
            && self.category.as_deref().map(|c| c == row.category).unwrap_or(true)
    }
}

/// Sort orders offered by the sold-products table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SoldSort {
    /// Most recent sale first.
    #[default]
    Date,
    /// Unpaid, then partial, then paid.
    Status,
    /// Largest outstanding balance first.
    Remaining,
}

fn status_rank(status: PaymentStatus) -> u8 {
    match status {
        PaymentStatus::Unpaid => 0,
        PaymentStatus::Partial => 1,
        PaymentStatus::Paid => 2,
    }
}

/// Applies `filter`, then a stable sort by `sort`.
pub fn filter_and_sort(rows: &[SoldProduct], filter: &SoldFilter, sort: SoldSort) -> Vec<SoldProduct> {
    let mut out: Vec<SoldProduct> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();
    match sort {
        SoldSort::Date => out.sort_by(|a, b| b.sold_date.cmp(&a.sold_date)),
        SoldSort::Status => out.sort_by_key(|r| status_rank(r.payment_status)),
        SoldSort::Remaining => out.sort_by(|a, b| b.balance_due.cmp(&a.balance_due)),
    }
    out
}

/// Sum of profit/loss over the rows. Rows without a selling price, or
/// whose figures overflow, are left out rather than counted as zero.
pub fn total_profit<'a>(rows: impl IntoIterator<Item = &'a SoldProduct>) -> Money {
    rows.into_iter()
        .filter_map(|r| r.totals().ok()?.profit_or_loss.signed_amount())
        .sum()
}

/// Sum of outstanding balances.
pub fn total_outstanding<'a>(rows: impl IntoIterator<Item = &'a SoldProduct>) -> Money {
    rows.into_iter().map(|r| r.balance_due).sum()
}

/// Distinct branch names, sorted, for the branch filter dropdown.
pub fn distinct_branches(rows: &[SoldProduct]) -> Vec<String> {
    rows.iter()
        .map(|r| r.branch.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct categories, sorted, for the category filter dropdown.
pub fn distinct_categories(rows: &[SoldProduct]) -> Vec<String> {
    rows.iter()
        .map(|r| r.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Store & Restored Products
// =============================================================================

/// Free-text search over the store table.
pub fn search_store<'a>(rows: &'a [StoreProduct], term: &str) -> Vec<&'a StoreProduct> {
    let needle = term.trim().to_lowercase();
    rows.iter()
        .filter(|p| {
            needle.is_empty()
                || p.product_name.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
                || p.branch.to_lowercase().contains(&needle)
                || p.barcode.as_deref().map(|b| b.contains(&needle)).unwrap_or(false)
        })
        .collect()
}

/// Free-text search over the restored table.
pub fn search_restored<'a>(rows: &'a [RestoredProduct], term: &str) -> Vec<&'a RestoredProduct> {
    let needle = term.trim().to_lowercase();
    rows.iter()
        .filter(|p| {
            needle.is_empty()
                || p.product_name.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
                || p.model.as_deref().unwrap_or("").to_lowercase().contains(&needle)
                || p.branch.name.to_lowercase().contains(&needle)
                || p.restore_comment.as_deref().unwrap_or("").to_lowercase().contains(&needle)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, Quantity, QuantityUnit};
    use chrono::{TimeZone, Utc};

    fn row(id: &str, day: u32, status: PaymentStatus, balance: i64, selling: Option<i64>) -> SoldProduct {
        let total = 10_000;
        SoldProduct {
            id: id.into(),
            product_name: format!("Item {id}"),
            category: if day % 2 == 0 { "Tools".into() } else { "Food".into() },
            quantity: Quantity::new(2, QuantityUnit::Pcs),
            branch: if day < 10 { "Main".into() } else { "Remera".into() },
            cost_price: Money::from_units(4_000),
            selling_price: selling.map(Money::from_units),
            total_amount_to_pay: Money::from_units(total),
            amount_paid: Money::from_units(total - balance),
            balance_due: Money::from_units(balance),
            payment_method: PaymentMethod::Credit,
            payment_status: status,
            customer_name: Some(format!("Customer {id}")),
            customer_contact: None,
            due_date: None,
            sold_date: Utc.with_ymd_and_hms(2025, 10, day, 9, 0, 0).unwrap(),
        }
    }

    fn rows() -> Vec<SoldProduct> {
        vec![
            row("a", 1, PaymentStatus::Paid, 0, Some(5_000)),
            row("b", 12, PaymentStatus::Unpaid, 10_000, Some(5_000)),
            row("c", 5, PaymentStatus::Partial, 4_000, Some(3_000)),
            row("d", 20, PaymentStatus::Unpaid, 10_000, None),
        ]
    }

    fn ids(rows: &[SoldProduct]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_date_desc() {
        let out = filter_and_sort(&rows(), &SoldFilter::default(), SoldSort::Date);
        assert_eq!(ids(&out), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_status_unpaid_first() {
        let out = filter_and_sort(&rows(), &SoldFilter::default(), SoldSort::Status);
        assert_eq!(ids(&out), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_sort_by_remaining() {
        let out = filter_and_sort(&rows(), &SoldFilter::default(), SoldSort::Remaining);
        assert_eq!(ids(&out)[2..], ["c", "a"]);
    }

    #[test]
    fn test_filters_combine() {
        let filter = SoldFilter {
            search: "customer".into(),
            status: Some(PaymentStatus::Unpaid),
            branch: Some("Remera".into()),
            category: None,
        };
        let out = filter_and_sort(&rows(), &filter, SoldSort::Date);
        assert_eq!(ids(&out), vec!["d", "b"]);

        let filter = SoldFilter {
            search: "ITEM C".into(),
            ..SoldFilter::default()
        };
        assert_eq!(ids(&filter_and_sort(&rows(), &filter, SoldSort::Date)), vec!["c"]);
    }

    #[test]
    fn test_total_profit_skips_unpriced_rows() {
        // a: (5000-4000)*2 = 2000, b: 2000, c: (3000-4000)*2 = -2000, d: unavailable
        assert_eq!(total_profit(&rows()), Money::from_units(2_000));
        assert_eq!(total_outstanding(&rows()), Money::from_units(24_000));
    }

    #[test]
    fn test_distinct_dropdown_values() {
        assert_eq!(distinct_branches(&rows()), vec!["Main", "Remera"]);
        assert_eq!(distinct_categories(&rows()), vec!["Food", "Tools"]);
    }
}
