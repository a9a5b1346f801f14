//! Store product endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use tally_core::selling::StoreSale;
use tally_core::{ProductStatus, SoldProduct, StoreProduct, StoreProductForm};

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct ProductList {
    products: Vec<StoreProduct>,
}

#[derive(Debug, Deserialize)]
struct ProductOne {
    product: StoreProduct,
}

/// Backend answer to a store sale: the product after the stock change and
/// the recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SellReceipt {
    pub product: StoreProduct,
    pub sale: SoldProduct,
}

impl<T: TokenSource> ApiClient<T> {
    /// Products currently in store.
    pub async fn list_store_products(&self) -> ApiResult<Vec<StoreProduct>> {
        let req = self
            .builder(Method::GET, &["products"])
            .await?
            .query(&[("status", ProductStatus::Store.to_string().to_lowercase())]);
        Ok(self.send_envelope::<ProductList>(req).await?.products)
    }

    pub async fn create_store_product(&self, form: &StoreProductForm) -> ApiResult<StoreProduct> {
        let req = self.builder(Method::POST, &["products"]).await?.json(form);
        let product = self.send_envelope::<ProductOne>(req).await?.product;
        info!(product_id = %product.id, "Store product created");
        Ok(product)
    }

    pub async fn update_store_product(&self, id: &str, form: &StoreProductForm) -> ApiResult<StoreProduct> {
        let req = self.builder(Method::PUT, &["products", id]).await?.json(form);
        Ok(self.send_envelope::<ProductOne>(req).await?.product)
    }

    /// Moves a product to the trash.
    pub async fn delete_store_product(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::DELETE, &["products", id]).await?;
        self.send_empty(req).await?;
        info!(product_id = %id, "Store product moved to trash");
        Ok(())
    }

    /// Records a sale from store stock. Validate with
    /// [`tally_core::selling::validate_store_sale`] first.
    pub async fn sell_store_product(&self, id: &str, sale: &StoreSale) -> ApiResult<SellReceipt> {
        let req = self.builder(Method::POST, &["products", id, "sell"]).await?.json(sale);
        let receipt = self.send_envelope::<SellReceipt>(req).await?;
        info!(
            product_id = %id,
            quantity = sale.quantity,
            status = %receipt.sale.payment_status,
            "Store product sold"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{client, serve, FixedToken};
    use axum::extract::{Path, Query};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tally_core::selling::StoreSale;
    use tally_core::{Money, PaymentMethod, PaymentStatus, ProductStatus};

    fn product(id: &str, qty: i64, status: &str) -> Value {
        json!({
            "_id": id,
            "productName": "Cement 50kg",
            "category": "Building",
            "quantity": {"value": qty, "unit": "pcs"},
            "branch": "Main",
            "status": status,
            "costPrice": 9000,
            "sellingPrice": 11000,
            "lastUpdated": "2025-10-01T08:00:00Z"
        })
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/products",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("status").map(String::as_str), Some("store"));
                    Json(json!({"success": true, "data": {"products": [product("p1", 40, "store")]}}))
                }),
            )
            .route(
                "/products/{id}",
                put(|Path(id): Path<String>, Json(_): Json<Value>| async move {
                    Json(json!({"success": true, "data": {"product": product(&id, 40, "store")}}))
                })
                .delete(|| async { Json(json!({"success": true, "message": "Moved to trash"})) }),
            )
            .route(
                "/products/{id}/sell",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let qty = body["quantity"].as_i64().unwrap_or(0);
                    let paid = body["amountPaid"].as_i64().unwrap_or(0);
                    let total = qty * 11000;
                    let status = if paid == 0 {
                        "Unpaid"
                    } else if paid < total {
                        "Partial"
                    } else {
                        "Paid"
                    };
                    let method = body["paymentMethod"].clone();
                    let customer = body["customerName"].clone();
                    let remaining = 40 - qty;
                    let balance = total - paid;
                    let sale = json!({
                        "_id": "s1",
                        "productName": "Cement 50kg",
                        "category": "Building",
                        "quantity": {"value": qty, "unit": "pcs"},
                        "branch": "Main",
                        "costPrice": 9000,
                        "sellingPrice": 11000,
                        "totalAmountToPay": total,
                        "amountPaid": paid,
                        "balanceDue": balance,
                        "paymentMethod": method,
                        "paymentStatus": status,
                        "customerName": customer,
                        "soldDate": "2025-10-02T10:00:00Z"
                    });
                    Json(json!({"success": true, "data": {"product": product(&id, remaining, "store"), "sale": sale}}))
                }),
            )
    }

    #[tokio::test]
    async fn test_list_and_sell() {
        let api = client(serve(app()).await, FixedToken(Some("t".into())));

        let products = api.list_store_products().await.unwrap();
        assert_eq!(products[0].status, ProductStatus::Store);
        assert_eq!(products[0].available(), 40);

        let sale = StoreSale {
            quantity: 3,
            selling_price: Some(Money::from_units(11_000)),
            amount_paid: Money::from_units(10_000),
            customer_name: "Eric".into(),
            customer_contact: None,
            payment_method: PaymentMethod::MobileMoney,
            due_date: None,
            expiry_date: None,
        };
        let receipt = api.sell_store_product("p1", &sale).await.unwrap();
        assert_eq!(receipt.product.available(), 37);
        assert_eq!(receipt.sale.balance_due, Money::from_units(23_000));
        assert_eq!(receipt.sale.payment_status, PaymentStatus::Partial);
        assert_eq!(receipt.sale.payment_method, PaymentMethod::MobileMoney);

        api.delete_store_product("p1").await.unwrap();
    }
}
