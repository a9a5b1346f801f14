//! # Products Store Commands
//!
//! Everyone signed in may browse and add stock; selling needs a seller role;
//! edit and delete are admin actions.

use chrono::Utc;
use tracing::debug;

use tally_api::SellReceipt;
use tally_core::authz::Screen;
use tally_core::listing::search_store;
use tally_core::selling::{validate_store_sale, StoreSale};
use tally_core::validation::validate_store_product_form;
use tally_core::{StoreProduct, StoreProductForm};

use super::CsvExport;
use crate::error::ScreenError;
use crate::state::Dashboard;

/// Lists store stock, narrowed by `search` when given.
pub async fn list_store_products(app: &Dashboard, search: Option<String>) -> Result<Vec<StoreProduct>, ScreenError> {
    app.enter(Screen::ProductsStore).await?;
    let products = app.api().list_store_products().await?;
    Ok(match search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => search_store(&products, term).into_iter().cloned().collect(),
        _ => products,
    })
}

pub async fn create_store_product(app: &Dashboard, form: StoreProductForm) -> Result<StoreProduct, ScreenError> {
    debug!(product = %form.product_name, "create_store_product command");
    app.enter(Screen::ProductsStore).await?;
    validate_store_product_form(&form)?;
    Ok(app.api().create_store_product(&form).await?)
}

pub async fn update_store_product(
    app: &Dashboard,
    id: String,
    form: StoreProductForm,
) -> Result<StoreProduct, ScreenError> {
    debug!(product_id = %id, "update_store_product command");
    app.enter(Screen::ProductsStore)
        .await?
        .require_admin(Screen::ProductsStore, "edit products")?;
    validate_store_product_form(&form)?;
    Ok(app.api().update_store_product(&id, &form).await?)
}

/// Moves the product to the trash.
pub async fn delete_store_product(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(product_id = %id, "delete_store_product command");
    app.enter(Screen::ProductsStore)
        .await?
        .require_admin(Screen::ProductsStore, "delete products")?;
    Ok(app.api().delete_store_product(&id).await?)
}

/// Validates the sale against the row the user sold from, then records it.
pub async fn sell_store_product(
    app: &Dashboard,
    product: StoreProduct,
    sale: StoreSale,
) -> Result<SellReceipt, ScreenError> {
    debug!(product_id = %product.id, quantity = sale.quantity, "sell_store_product command");
    app.enter(Screen::ProductsStore)
        .await?
        .require_seller(Screen::ProductsStore)?;
    validate_store_sale(&product, &sale, Utc::now().date_naive())?;
    Ok(app.api().sell_store_product(&product.id, &sale).await?)
}

pub async fn export_store_products(app: &Dashboard, search: Option<String>) -> Result<CsvExport, ScreenError> {
    let products = list_store_products(app, search).await?;
    CsvExport::render(&products)
}
