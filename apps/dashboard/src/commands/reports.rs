//! # Dashboard Commands
//!
//! Headline figures for the landing screen, with money already formatted in
//! the configured currency.

use serde::Serialize;

use tally_core::authz::Screen;
use tally_core::DashboardStats;

use crate::error::ScreenError;
use crate::state::Dashboard;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub cards: Vec<StatCard>,
}

pub async fn dashboard_stats(app: &Dashboard) -> Result<DashboardView, ScreenError> {
    app.enter(Screen::Dashboard).await?;
    let stats = app.api().dashboard_stats().await?;
    let currency = app.config().display.currency.as_str();

    let cards = vec![
        StatCard {
            title: "Total Products",
            value: stats.total_products.to_string(),
        },
        StatCard {
            title: "Stock Value",
            value: stats.stock_value.format_with(currency),
        },
        StatCard {
            title: "Total Profit",
            value: stats.total_profit.format_with(currency),
        },
        StatCard {
            title: "Outstanding Payments",
            value: stats.outstanding_payments.format_with(currency),
        },
        StatCard {
            title: "Products Sold",
            value: stats.sold_products.to_string(),
        },
        StatCard {
            title: "Deleted Products",
            value: stats.deleted_products.to_string(),
        },
    ];

    Ok(DashboardView { stats, cards })
}
