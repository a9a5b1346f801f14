//! Sold product endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::{Money, SoldProduct};

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct SoldList {
    products: Vec<SoldProduct>,
}

#[derive(Debug, Deserialize)]
struct SoldOne {
    product: SoldProduct,
}

#[derive(Debug, Serialize)]
struct PaymentBody {
    amount: Money,
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn list_sold_products(&self) -> ApiResult<Vec<SoldProduct>> {
        let req = self.builder(Method::GET, &["sold"]).await?;
        Ok(self.send_envelope::<SoldList>(req).await?.products)
    }

    /// Posts a payment against a credit sale. The ledger check happens
    /// before this call; the backend returns the updated record.
    pub async fn record_payment(&self, sale_id: &str, amount: Money) -> ApiResult<SoldProduct> {
        let req = self
            .builder(Method::PUT, &["sold", sale_id, "payment"])
            .await?
            .json(&PaymentBody { amount });
        let product = self.send_envelope::<SoldOne>(req).await?.product;
        info!(
            sale_id = %sale_id,
            amount = amount.units(),
            balance_due = product.balance_due.units(),
            "Payment recorded"
        );
        Ok(product)
    }
}
