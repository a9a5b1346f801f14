//! Trash endpoints: soft-deleted products awaiting restore or purge.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, warn};

use tally_core::TrashedProduct;

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct TrashList {
    products: Vec<TrashedProduct>,
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn list_trash(&self) -> ApiResult<Vec<TrashedProduct>> {
        let req = self.builder(Method::GET, &["trash"]).await?;
        Ok(self.send_envelope::<TrashList>(req).await?.products)
    }

    /// Puts a trashed product back where it came from.
    pub async fn restore_from_trash(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::PUT, &["trash", id, "restore"]).await?;
        self.send_empty(req).await?;
        info!(product_id = %id, "Product restored from trash");
        Ok(())
    }

    /// Deletes a trashed product permanently.
    pub async fn purge_from_trash(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::DELETE, &["trash", id]).await?;
        self.send_empty(req).await?;
        warn!(product_id = %id, "Product permanently deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{client, serve, FixedToken};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{delete, get, put};
    use axum::{Json, Router};
    use serde_json::json;
    use tally_core::TrashOrigin;

    fn app() -> Router {
        Router::new()
            .route(
                "/trash",
                get(|| async {
                    Json(json!({"success": true, "data": {"products": [{
                        "_id": "t1",
                        "productName": "Paint 5L",
                        "category": "Building",
                        "quantity": {"value": 4, "unit": "liter"},
                        "costPrice": 20000,
                        "originalType": "store",
                        "branch": "Main",
                        "deletedDate": "2025-10-03T09:00:00Z"
                    }]}}))
                }),
            )
            .route("/trash/{id}/restore", put(|| async { Json(json!({"success": true})) }))
            .route(
                "/trash/{id}",
                delete(|Path(id): Path<String>| async move {
                    if id == "t1" {
                        (StatusCode::OK, Json(json!({"success": true})))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"detail": "Product not found in trash"})))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_trash_calls() {
        let api = client(serve(app()).await, FixedToken(Some("t".into())));

        let rows = api.list_trash().await.unwrap();
        assert_eq!(rows[0].original_type, TrashOrigin::Store);
        assert_eq!(rows[0].selling_price, None);

        api.restore_from_trash("t1").await.unwrap();
        api.purge_from_trash("t1").await.unwrap();

        let err = api.purge_from_trash("t9").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Product not found in trash");
    }
}
