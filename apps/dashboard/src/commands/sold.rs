//! # Products Sold Commands
//!
//! Filtered sales table, the total profit banner, and credit payments.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_payment(sale, amount)                                          │
//! │     │                                                                   │
//! │     ├─► guard: seller role                  ── ACCESS_DENIED           │
//! │     ├─► ledger: 0 < amount <= balance_due   ── VALIDATION_ERROR        │
//! │     ├─► claim sale id                        ── PAYMENT_IN_FLIGHT       │
//! │     └─► PUT /sold/{id}/payment ──► updated row                         │
//! │                                                                         │
//! │  The claim is released when the call returns, success or not.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::authz::Screen;
use tally_core::listing::{
    distinct_branches, distinct_categories, filter_and_sort, total_outstanding, total_profit, SoldFilter, SoldSort,
};
use tally_core::{Money, SoldProduct};

use super::CsvExport;
use crate::error::ScreenError;
use crate::state::Dashboard;

/// What the sold-products screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldView {
    pub rows: Vec<SoldProduct>,
    /// Sum over the visible rows; rows without a selling price are skipped.
    pub total_profit: Money,
    pub total_profit_label: String,
    pub outstanding: Money,
    /// Filter dropdown options, taken from every row rather than the
    /// visible ones.
    pub branches: Vec<String>,
    pub categories: Vec<String>,
}

pub async fn list_sold_products(app: &Dashboard, filter: SoldFilter, sort: SoldSort) -> Result<SoldView, ScreenError> {
    app.enter(Screen::ProductsSold).await?;
    let all = app.api().list_sold_products().await?;
    let rows = filter_and_sort(&all, &filter, sort);
    let profit = total_profit(&rows);

    Ok(SoldView {
        total_profit: profit,
        total_profit_label: profit.format_with(&app.config().display.currency),
        outstanding: total_outstanding(&rows),
        branches: distinct_branches(&all),
        categories: distinct_categories(&all),
        rows,
    })
}

/// Records a payment against a credit sale. A second payment for the same
/// sale is refused while the first is outstanding.
pub async fn record_payment(app: &Dashboard, sale: SoldProduct, amount: Money) -> Result<SoldProduct, ScreenError> {
    debug!(sale_id = %sale.id, amount = amount.units(), "record_payment command");
    app.enter(Screen::ProductsSold)
        .await?
        .require_seller(Screen::ProductsSold)?;

    let expected = sale.credit()?.record_payment(amount)?;

    let Some(_ticket) = app.payments().try_begin(&sale.id) else {
        warn!(sale_id = %sale.id, "Payment already in flight");
        return Err(ScreenError::payment_in_flight());
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, sale_id = %sale.id, amount = amount.units(), "Recording payment");
    let updated = app.api().record_payment(&sale.id, amount).await?;

    if updated.balance_due != expected.balance_due() {
        warn!(
            %request_id,
            sale_id = %sale.id,
            expected = expected.balance_due().units(),
            actual = updated.balance_due.units(),
            "Backend balance differs from local ledger"
        );
    }
    Ok(updated)
}

pub async fn export_sold_products(app: &Dashboard, filter: SoldFilter, sort: SoldSort) -> Result<CsvExport, ScreenError> {
    let view = list_sold_products(app, filter, sort).await?;
    CsvExport::render(&view.rows)
}
