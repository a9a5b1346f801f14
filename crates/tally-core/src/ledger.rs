//! # Credit Ledger
//!
//! Payments against credit sales, and profit/loss of a sale line.
//!
//! ## Ledger Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CreditSale                                       │
//! │                                                                         │
//! │   total_amount_to_pay = quantity × unit price      (fixed at sale)      │
//! │   amount_paid         ──► only grows, via record_payment                │
//! │   balance_due         = total − paid                                    │
//! │                                                                         │
//! │   payment_status:                                                       │
//! │     balance == 0           → Paid                                       │
//! │     paid == 0              → Unpaid                                     │
//! │     otherwise              → Partial                                    │
//! │                                                                         │
//! │   record_payment(amount):                                               │
//! │     0 < amount ≤ balance   → new CreditSale                             │
//! │     anything else          → PaymentOutOfRange (never clamped)          │
//! │     balance == 0           → SaleSettled                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger is a value type. Two callers that both read the same sale and
//! both record a payment will each get a valid result computed from the same
//! starting balance; serializing those calls is the caller's job (the sold
//! screen holds a per-sale in-flight guard).

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PaymentStatus;

// =============================================================================
// Credit Sale
// =============================================================================

/// The payment state of one sale.
///
/// Fields are private so the invariant `amount_paid + balance_due ==
/// total_amount_to_pay` can only be established by the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreditSale {
    total_amount_to_pay: Money,
    amount_paid: Money,
    balance_due: Money,
    payment_status: PaymentStatus,
}

impl CreditSale {
    /// Creates the credit sale for `quantity` units at `unit_price`, with
    /// `amount_paid` handed over at the counter.
    pub fn new(quantity: i64, unit_price: Money, amount_paid: Money) -> CoreResult<Self> {
        let total = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| too_large("Total amount"))?;
        Self::from_parts(total, amount_paid)
    }

    /// Rebuilds a sale from its stored total and paid amounts.
    ///
    /// ## Errors
    /// - `Validation(Negative)` if either amount is below zero
    /// - `OverPayment` if more was paid than is owed
    pub fn from_parts(total_amount_to_pay: Money, amount_paid: Money) -> CoreResult<Self> {
        if total_amount_to_pay.is_negative() {
            return Err(ValidationError::Negative {
                field: "Total amount".to_string(),
            }
            .into());
        }
        if amount_paid.is_negative() {
            return Err(ValidationError::Negative {
                field: "Amount paid".to_string(),
            }
            .into());
        }
        if amount_paid > total_amount_to_pay {
            return Err(CoreError::OverPayment {
                paid: amount_paid,
                total: total_amount_to_pay,
            });
        }

        let balance_due = total_amount_to_pay - amount_paid;
        Ok(CreditSale {
            total_amount_to_pay,
            amount_paid,
            balance_due,
            payment_status: status_for(amount_paid, balance_due),
        })
    }

    /// Applies a payment and returns the updated sale. `self` is untouched.
    ///
    /// ```rust
    /// use tally_core::ledger::CreditSale;
    /// use tally_core::{Money, PaymentStatus};
    ///
    /// let sale = CreditSale::from_parts(Money::from_units(30_000), Money::zero()).unwrap();
    /// let paid = sale.record_payment(Money::from_units(30_000)).unwrap();
    /// assert_eq!(paid.payment_status(), PaymentStatus::Paid);
    /// assert!(paid.record_payment(Money::from_units(1)).is_err());
    /// ```
    pub fn record_payment(&self, amount: Money) -> CoreResult<CreditSale> {
        if self.is_settled() {
            return Err(CoreError::SaleSettled);
        }
        if !amount.is_positive() || amount > self.balance_due {
            return Err(CoreError::PaymentOutOfRange {
                amount,
                min: Money::from_units(1),
                max: self.balance_due,
            });
        }

        let amount_paid = self.amount_paid + amount;
        let balance_due = self.total_amount_to_pay - amount_paid;
        Ok(CreditSale {
            total_amount_to_pay: self.total_amount_to_pay,
            amount_paid,
            balance_due,
            payment_status: status_for(amount_paid, balance_due),
        })
    }

    pub fn total_amount_to_pay(&self) -> Money {
        self.total_amount_to_pay
    }

    pub fn amount_paid(&self) -> Money {
        self.amount_paid
    }

    pub fn balance_due(&self) -> Money {
        self.balance_due
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// True once nothing remains to be paid.
    pub fn is_settled(&self) -> bool {
        self.balance_due.is_zero()
    }
}

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}

/// Derives the payment status from the paid and outstanding amounts.
pub fn status_for(amount_paid: Money, balance_due: Money) -> PaymentStatus {
    if balance_due.is_zero() {
        PaymentStatus::Paid
    } else if amount_paid.is_zero() {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Partial
    }
}

// =============================================================================
// Profit / Loss
// =============================================================================

/// Outcome of a sale line. `Unavailable` is distinct from `BreakEven`: a
/// missing selling price is never read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum ProfitOrLoss {
    Profit(Money),
    Loss(Money),
    BreakEven,
    Unavailable,
}

impl ProfitOrLoss {
    /// Signed amount, `None` when unavailable.
    pub fn signed_amount(&self) -> Option<Money> {
        match self {
            ProfitOrLoss::Profit(m) => Some(*m),
            ProfitOrLoss::Loss(m) => Some(-*m),
            ProfitOrLoss::BreakEven => Some(Money::zero()),
            ProfitOrLoss::Unavailable => None,
        }
    }
}

/// Computed figures of a sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub total_cost: Money,
    pub revenue: Option<Money>,
    pub profit_or_loss: ProfitOrLoss,
}

/// Computes `(selling − cost) × quantity` and classifies the result.
///
/// ```rust
/// use tally_core::ledger::{compute_totals, ProfitOrLoss};
/// use tally_core::Money;
///
/// let totals = compute_totals(Money::from_units(1_200), None, 5).unwrap();
/// assert_eq!(totals.profit_or_loss, ProfitOrLoss::Unavailable);
/// assert_eq!(totals.total_cost, Money::from_units(6_000));
/// ```
///
/// ## Errors
/// - `Validation(TooLarge)` if any figure overflows
pub fn compute_totals(cost_price: Money, selling_price: Option<Money>, quantity: i64) -> CoreResult<SaleTotals> {
    let total_cost = cost_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| too_large("Total cost"))?;

    let Some(selling_price) = selling_price else {
        return Ok(SaleTotals {
            total_cost,
            revenue: None,
            profit_or_loss: ProfitOrLoss::Unavailable,
        });
    };

    let revenue = selling_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| too_large("Revenue"))?;
    let delta = revenue
        .checked_sub(total_cost)
        .ok_or_else(|| too_large("Profit"))?;
    let profit_or_loss = if delta.is_positive() {
        ProfitOrLoss::Profit(delta)
    } else if delta.is_negative() {
        ProfitOrLoss::Loss(delta.abs())
    } else {
        ProfitOrLoss::BreakEven
    };

    Ok(SaleTotals {
        total_cost,
        revenue: Some(revenue),
        profit_or_loss,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
