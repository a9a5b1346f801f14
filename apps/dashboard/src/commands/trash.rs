//! # Trash Commands
//!
//! Restoring puts a product back on its original table; purging is
//! permanent and admin only.

use tracing::debug;

use tally_core::authz::Screen;
use tally_core::TrashedProduct;

use crate::error::ScreenError;
use crate::state::Dashboard;

pub async fn list_trash(app: &Dashboard) -> Result<Vec<TrashedProduct>, ScreenError> {
    app.enter(Screen::Trash).await?;
    let mut products = app.api().list_trash().await?;
    products.sort_by(|a, b| b.deleted_date.cmp(&a.deleted_date));
    Ok(products)
}

pub async fn restore_from_trash(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(product_id = %id, "restore_from_trash command");
    app.enter(Screen::Trash).await?;
    Ok(app.api().restore_from_trash(&id).await?)
}

pub async fn purge_from_trash(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(product_id = %id, "purge_from_trash command");
    app.enter(Screen::Trash)
        .await?
        .require_admin(Screen::Trash, "permanently delete products")?;
    Ok(app.api().purge_from_trash(&id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn trashed(id: &str, deleted: &str) -> Value {
        json!({
            "_id": id, "productName": "Paint 5L", "category": "Building",
            "quantity": {"value": 4, "unit": "liter"}, "costPrice": 20000,
            "originalType": "sold", "branch": "Main", "deletedDate": deleted
        })
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/trash",
                get(|| async {
                    Json(json!({"success": true, "data": {"products": [
                        trashed("t1", "2025-10-01T09:00:00Z"),
                        trashed("t2", "2025-10-05T09:00:00Z")
                    ]}}))
                }),
            )
            .route("/trash/{id}/restore", put(|| async { Json(json!({"success": true})) }))
            .route(
                "/trash/{id}",
                axum::routing::delete(|| async {
                    (StatusCode::NOT_FOUND, Json(json!({"detail": "Product not found in trash"})))
                }),
            )
    }

    #[tokio::test]
    async fn test_newest_first_and_restore() {
        let t = TestApp::with_backend(backend()).await;
        t.login_staff().await;

        let rows = list_trash(&t.app).await.unwrap();
        assert_eq!(rows[0].id, "t2");
        restore_from_trash(&t.app, "t1".into()).await.unwrap();
    }

    #[tokio::test]
    async fn test_purge_is_admin_only() {
        let t = TestApp::with_backend(backend()).await;
        t.login_staff().await;
        assert!(purge_from_trash(&t.app, "t1".into()).await.unwrap_err().is_access_denied());
        assert_eq!(t.hits(), 0);

        t.app.session().logout().await.unwrap();
        t.login_admin().await;
        let err = purge_from_trash(&t.app, "t9".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found in trash");
    }
}
