//! Restored product endpoints.

use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use tally_core::selling::RestoredSellRequest;
use tally_core::{Branch, RestoredProduct};

use crate::client::{ApiClient, TokenSource};
use crate::envelope::ApiResponse;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct RestoredList {
    products: Vec<RestoredProduct>,
}

/// `/restored/branches` has answered in three shapes over time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BranchesBody {
    Bare(Vec<Branch>),
    TopLevel { branches: Vec<Branch> },
    Wrapped(ApiResponse<WrappedBranches>),
}

#[derive(Debug, Deserialize)]
struct WrappedBranches {
    branches: Vec<Branch>,
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn list_restored_products(&self) -> ApiResult<Vec<RestoredProduct>> {
        let req = self.builder(Method::GET, &["restored"]).await?;
        Ok(self.send_envelope::<RestoredList>(req).await?.products)
    }

    /// Branches that hold restored stock.
    pub async fn list_restored_branches(&self) -> ApiResult<Vec<Branch>> {
        let req = self.builder(Method::GET, &["restored", "branches"]).await?;
        match self.send_raw::<BranchesBody>(req).await? {
            BranchesBody::Bare(branches) | BranchesBody::TopLevel { branches } => Ok(branches),
            BranchesBody::Wrapped(response) => Ok(response.into_data(200)?.branches),
        }
    }

    /// Sells restored stock. The returned record has status `Sold` once the
    /// stock is exhausted.
    pub async fn sell_restored_product(&self, id: &str, request: RestoredSellRequest) -> ApiResult<RestoredProduct> {
        let req = self
            .builder(Method::PUT, &["restored", id, "sell"])
            .await?
            .json(&request);
        let product = self.send_envelope::<RestoredProduct>(req).await?;
        info!(
            product_id = %id,
            quantity = request.quantity,
            status = %product.status,
            "Restored product sold"
        );
        Ok(product)
    }

    pub async fn delete_restored_product(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::DELETE, &["restored", id]).await?;
        self.send_empty(req).await?;
        info!(product_id = %id, "Restored product deleted");
        Ok(())
    }
}
