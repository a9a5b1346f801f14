//! Dashboard report endpoint.

use reqwest::Method;
use serde::Deserialize;

use tally_core::DashboardStats;

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct StatsBody {
    stats: DashboardStats,
}

impl<T: TokenSource> ApiClient<T> {
    /// Headline figures for the landing screen. Missing figures read as zero.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let req = self.builder(Method::GET, &["reports", "dashboard"]).await?;
        Ok(self.send_envelope::<StatsBody>(req).await?.stats)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{client, serve, FixedToken};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use tally_core::Money;

    #[tokio::test]
    async fn test_partial_stats_default_to_zero() {
        let app = Router::new().route(
            "/reports/dashboard",
            get(|| async {
                Json(json!({"success": true, "data": {"stats": {
                    "totalProducts": 120,
                    "stockValue": 4500000,
                    "mostSoldProduct": {"name": "Cement 50kg", "units": 310}
                }}}))
            }),
        );
        let api = client(serve(app).await, FixedToken(Some("t".into())));

        let stats = api.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_products, 120);
        assert_eq!(stats.stock_value, Money::from_units(4_500_000));
        assert_eq!(stats.most_sold_product.units, 310);
        assert_eq!(stats.loss, Money::zero());
        assert_eq!(stats.active_suppliers, 0);
    }
}
