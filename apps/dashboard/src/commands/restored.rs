//! # Products Restored Commands

use serde::Serialize;
use tracing::debug;

use tally_core::authz::Screen;
use tally_core::listing::search_restored;
use tally_core::selling::validate_restored_sale;
use tally_core::{Branch, Money, ProductStatus, RestoredProduct};

use super::CsvExport;
use crate::error::ScreenError;
use crate::state::Dashboard;

/// Result of selling restored stock. `removed` tells the table to drop the
/// row because nothing is left to sell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredSale {
    pub product: RestoredProduct,
    pub removed: bool,
}

pub async fn list_restored_products(
    app: &Dashboard,
    search: Option<String>,
) -> Result<Vec<RestoredProduct>, ScreenError> {
    app.enter(Screen::ProductsRestored).await?;
    let products = app.api().list_restored_products().await?;
    let term = search.unwrap_or_default();
    Ok(search_restored(&products, &term).into_iter().cloned().collect())
}

pub async fn list_restored_branches(app: &Dashboard) -> Result<Vec<Branch>, ScreenError> {
    app.enter(Screen::ProductsRestored).await?;
    Ok(app.api().list_restored_branches().await?)
}

pub async fn sell_restored_product(
    app: &Dashboard,
    product: RestoredProduct,
    quantity: i64,
    selling_price: Option<Money>,
) -> Result<RestoredSale, ScreenError> {
    debug!(product_id = %product.id, quantity, "sell_restored_product command");
    app.enter(Screen::ProductsRestored)
        .await?
        .require_seller(Screen::ProductsRestored)?;
    let request = validate_restored_sale(&product, quantity, selling_price)?;
    let product = app.api().sell_restored_product(&product.id, request).await?;
    Ok(RestoredSale {
        removed: product.status == ProductStatus::Sold,
        product,
    })
}

pub async fn delete_restored_product(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(product_id = %id, "delete_restored_product command");
    app.enter(Screen::ProductsRestored)
        .await?
        .require_admin(Screen::ProductsRestored, "delete products")?;
    Ok(app.api().delete_restored_product(&id).await?)
}

pub async fn export_restored_products(app: &Dashboard, search: Option<String>) -> Result<CsvExport, ScreenError> {
    let products = list_restored_products(app, search).await?;
    CsvExport::render(&products)
}
