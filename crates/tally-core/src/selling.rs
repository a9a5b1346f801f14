//! # Sell Flows
//!
//! Validation and derived figures for the two ways stock leaves the shelf.
//!
//! ## Sell From Store
//! ```text
//! StoreProduct (20 pcs)           StoreSale { qty 5, price 7,000, paid 10,000 }
//!        │                                      │
//!        └───────────────┬──────────────────────┘
//!                        ▼
//!            validate_store_sale(today)
//!                        │
//!        ┌───────────────┼──────────────────────────────┐
//!        ▼               ▼                              ▼
//!  remaining 15    status Store (Sold at 0)   CreditSale { total 35,000,
//!                                                          paid 10,000,
//!                                                          balance 25,000,
//!                                                          Partial }
//! ```
//!
//! Checks run in the order the sell dialog reports them: stock, quantity,
//! price, amount paid, customer, expiry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::{compute_totals, CreditSale, SaleTotals};
use crate::money::Money;
use crate::types::{PaymentMethod, ProductStatus, RestoredProduct, StoreProduct};

// =============================================================================
// Sell From Store
// =============================================================================

/// What the cashier entered in the sell dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreSale {
    pub quantity: i64,
    pub selling_price: Option<Money>,
    #[serde(default)]
    pub amount_paid: Money,
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
}

/// Result of a validated store sale.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SellOutcome {
    pub remaining_stock: i64,
    pub new_status: ProductStatus,
    pub unit_price: Money,
    pub credit: CreditSale,
    pub totals: SaleTotals,
}

/// Validates a sale from store stock and derives its outcome.
pub fn validate_store_sale(product: &StoreProduct, sale: &StoreSale, today: NaiveDate) -> CoreResult<SellOutcome> {
    let available = product.available();

    if sale.quantity > available {
        return Err(CoreError::InsufficientStock {
            available,
            requested: sale.quantity,
        });
    }
    if sale.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Quantity".to_string(),
        }
        .into());
    }
    let unit_price = match sale.selling_price {
        Some(p) if p.is_positive() => p,
        _ => {
            return Err(ValidationError::MustBePositive {
                field: "Selling price".to_string(),
            }
            .into())
        }
    };
    if sale.amount_paid.is_negative() {
        return Err(ValidationError::Negative {
            field: "Amount paid".to_string(),
        }
        .into());
    }
    if sale.customer_name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Customer name".to_string(),
        }
        .into());
    }
    if sale.expiry_date.map(|d| d < today).unwrap_or(false) {
        return Err(ValidationError::InPast {
            field: "Expiry date".to_string(),
        }
        .into());
    }

    let credit = CreditSale::new(sale.quantity, unit_price, sale.amount_paid)?;
    let totals = compute_totals(product.cost_price, Some(unit_price), sale.quantity)?;
    let remaining_stock = available - sale.quantity;
    let new_status = if remaining_stock == 0 {
        ProductStatus::Sold
    } else {
        product.status
    };

    Ok(SellOutcome {
        remaining_stock,
        new_status,
        unit_price,
        credit,
        totals,
    })
}

// =============================================================================
// Sell From Restored
// =============================================================================

/// Body of `PUT /restored/{id}/sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestoredSellRequest {
    pub quantity: i64,
    pub selling_price: Money,
}

/// Validates a sale of restored stock.
///
/// ## Errors
/// - quantity outside `1..=available`: "Quantity must be a number between 1 and N."
/// - missing or non-positive price: "Selling price must be greater than 0."
pub fn validate_restored_sale(
    product: &RestoredProduct,
    quantity: i64,
    selling_price: Option<Money>,
) -> CoreResult<RestoredSellRequest> {
    if quantity < 1 || quantity > product.quantity {
        return Err(ValidationError::OutOfRange {
            field: "Quantity".to_string(),
            min: 1,
            max: product.quantity,
        }
        .into());
    }
    match selling_price {
        Some(price) if price.is_positive() => Ok(RestoredSellRequest {
            quantity,
            selling_price: price,
        }),
        _ => Err(ValidationError::MustBePositive {
            field: "Selling price".to_string(),
        }
        .into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Branch, PaymentStatus, Quantity, QuantityUnit};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn product(stock: i64) -> StoreProduct {
        StoreProduct {
            id: "p1".into(),
            product_name: "Organic Rice".into(),
            category: "Groceries".into(),
            brand: None,
            model: None,
            color: None,
            condition: None,
            quantity: Quantity::new(stock, QuantityUnit::Kg),
            branch: "Main Branch".into(),
            status: ProductStatus::Store,
            cost_price: Money::from_units(5_000),
            selling_price: Some(Money::from_units(7_000)),
            expiry_date: None,
            supplier: None,
            barcode: None,
            last_updated: Utc::now(),
        }
    }

    fn sale(quantity: i64, paid: i64) -> StoreSale {
        StoreSale {
            quantity,
            selling_price: Some(Money::from_units(7_000)),
            amount_paid: Money::from_units(paid),
            customer_name: "Alice".into(),
            customer_contact: Some("+250781234567".into()),
            payment_method: PaymentMethod::Credit,
            due_date: None,
            expiry_date: None,
        }
    }

    #[test]
    fn test_partial_sale() {
        let outcome = validate_store_sale(&product(20), &sale(5, 10_000), today()).unwrap();
        assert_eq!(outcome.remaining_stock, 15);
        assert_eq!(outcome.new_status, ProductStatus::Store);
        assert_eq!(outcome.credit.total_amount_to_pay(), Money::from_units(35_000));
        assert_eq!(outcome.credit.balance_due(), Money::from_units(25_000));
        assert_eq!(outcome.credit.payment_status(), PaymentStatus::Partial);
    }

    #[test]
    fn test_selling_last_unit_marks_sold() {
        let outcome = validate_store_sale(&product(5), &sale(5, 35_000), today()).unwrap();
        assert_eq!(outcome.remaining_stock, 0);
        assert_eq!(outcome.new_status, ProductStatus::Sold);
        assert_eq!(outcome.credit.payment_status(), PaymentStatus::Paid);
    }

    #[test]
    fn test_store_sale_error_messages() {
        let p = product(3);

        let err = validate_store_sale(&p, &sale(4, 0), today()).unwrap_err();
        assert_eq!(err.to_string(), "Quantity cannot exceed available stock of 3.");

        let err = validate_store_sale(&p, &sale(0, 0), today()).unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be greater than 0.");

        let mut s = sale(1, 0);
        s.selling_price = None;
        let err = validate_store_sale(&p, &s, today()).unwrap_err();
        assert_eq!(err.to_string(), "Selling price must be greater than 0.");

        let err = validate_store_sale(&p, &sale(1, -1), today()).unwrap_err();
        assert_eq!(err.to_string(), "Amount paid cannot be negative.");

        let mut s = sale(1, 0);
        s.customer_name = "  ".into();
        let err = validate_store_sale(&p, &s, today()).unwrap_err();
        assert_eq!(err.to_string(), "Customer name is required.");

        let mut s = sale(1, 0);
        s.expiry_date = NaiveDate::from_ymd_opt(2025, 10, 19);
        let err = validate_store_sale(&p, &s, today()).unwrap_err();
        assert_eq!(err.to_string(), "Expiry date cannot be in the past.");
    }

    #[test]
    fn test_overpaying_at_counter_rejected() {
        let err = validate_store_sale(&product(2), &sale(1, 8_000), today()).unwrap_err();
        assert!(matches!(err, CoreError::OverPayment { .. }));
    }

    #[test]
    fn test_oversized_sale_is_rejected() {
        let mut s = sale(3, 0);
        s.selling_price = Some(Money::from_units(i64::MAX / 2));
        let err = validate_store_sale(&product(20), &s, today()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::TooLarge { .. })));
        assert_eq!(err.to_string(), "Total amount is too large.");

        let mut p = product(20);
        p.cost_price = Money::from_units(i64::MAX / 2);
        let err = validate_store_sale(&p, &sale(3, 0), today()).unwrap_err();
        assert_eq!(err.to_string(), "Total cost is too large.");
    }

    fn restored(quantity: i64) -> RestoredProduct {
        RestoredProduct {
            id: "r1".into(),
            product_name: "Phone".into(),
            category: "Electronics".into(),
            model: Some("A12".into()),
            quantity,
            branch: Branch {
                id: "b".into(),
                name: "Main".into(),
                district: "d".into(),
                sector: "s".into(),
                cell: "c".into(),
                village: "v".into(),
                created_at: None,
            },
            status: ProductStatus::Restored,
            cost_price: Money::from_units(90_000),
            selling_price: None,
            created_at: None,
            restore_comment: Some("screen replaced".into()),
        }
    }

    #[test]
    fn test_restored_sale_bounds() {
        let p = restored(4);

        let err = validate_restored_sale(&p, 5, Some(Money::from_units(1))).unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be a number between 1 and 4.");

        let err = validate_restored_sale(&p, 0, Some(Money::from_units(1))).unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be a number between 1 and 4.");

        let err = validate_restored_sale(&p, 2, None).unwrap_err();
        assert_eq!(err.to_string(), "Selling price must be greater than 0.");

        let req = validate_restored_sale(&p, 4, Some(Money::from_units(120_000))).unwrap();
        assert_eq!(req.quantity, 4);
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["sellingPrice"], 120_000);
    }
}
