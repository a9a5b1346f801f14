//! Branch management endpoints.

use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use tally_core::{Branch, BranchForm};

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct BranchList {
    branches: Vec<Branch>,
}

#[derive(Debug, Deserialize)]
struct BranchOne {
    branch: Branch,
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn list_branches(&self) -> ApiResult<Vec<Branch>> {
        let req = self.builder(Method::GET, &["branches"]).await?;
        Ok(self.send_envelope::<BranchList>(req).await?.branches)
    }

    pub async fn get_branch(&self, id: &str) -> ApiResult<Branch> {
        let req = self.builder(Method::GET, &["branches", id]).await?;
        Ok(self.send_envelope::<BranchOne>(req).await?.branch)
    }

    pub async fn create_branch(&self, form: &BranchForm) -> ApiResult<Branch> {
        let req = self.builder(Method::POST, &["branches"]).await?.json(form);
        let branch = self.send_envelope::<BranchOne>(req).await?.branch;
        info!(branch_id = %branch.id, "Branch created");
        Ok(branch)
    }

    pub async fn update_branch(&self, id: &str, form: &BranchForm) -> ApiResult<Branch> {
        let req = self.builder(Method::PUT, &["branches", id]).await?.json(form);
        Ok(self.send_envelope::<BranchOne>(req).await?.branch)
    }

    pub async fn delete_branch(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::DELETE, &["branches", id]).await?;
        self.send_empty(req).await?;
        info!(branch_id = %id, "Branch deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{client, serve, FixedToken};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tally_core::BranchForm;

    fn branch(id: &str, name: &str) -> Value {
        json!({
            "_id": id,
            "branchName": name,
            "district": "Gasabo",
            "sector": "Remera",
            "cell": "Rukiri",
            "village": "Amahoro",
            "createdAt": "2025-01-10T08:00:00Z"
        })
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/branches",
                get(|| async {
                    Json(json!({"success": true, "data": {"branches": [branch("b1", "Main"), branch("b2", "Remera")]}}))
                })
                .post(|Json(body): Json<Value>| async move {
                    let name = body["branchName"].as_str().unwrap_or_default().to_string();
                    if name == "Main" {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"success": false, "message": "Branch already exists"})),
                        );
                    }
                    (
                        StatusCode::CREATED,
                        Json(json!({"success": true, "data": {"branch": branch("b3", &name)}})),
                    )
                }),
            )
            .route(
                "/branches/{id}",
                get(|Path(id): Path<String>| async move {
                    if id == "b1" {
                        (StatusCode::OK, Json(json!({"success": true, "data": {"branch": branch("b1", "Main")}})))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"detail": "Branch not found"})))
                    }
                })
                .put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let name = body["branchName"].as_str().unwrap_or_default().to_string();
                    Json(json!({"success": true, "data": {"branch": branch(&id, &name)}}))
                })
                .delete(|| async { Json(json!({"success": true, "message": "Branch deleted"})) }),
            )
    }

    fn form(name: &str) -> BranchForm {
        BranchForm {
            branch_name: name.into(),
            district: "Gasabo".into(),
            sector: "Remera".into(),
            cell: "Rukiri".into(),
            village: "Amahoro".into(),
        }
    }

    #[tokio::test]
    async fn test_branch_crud() {
        let api = client(serve(app()).await, FixedToken(Some("t".into())));

        let branches = api.list_branches().await.unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[1].name, "Remera");
        assert!(branches[0].created_at.is_some());

        assert_eq!(api.get_branch("b1").await.unwrap().id, "b1");
        let err = api.get_branch("zz").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Branch not found");

        let created = api.create_branch(&form("Kicukiro")).await.unwrap();
        assert_eq!(created.id, "b3");
        let err = api.create_branch(&form("Main")).await.unwrap_err();
        assert_eq!(err.to_string(), "Branch already exists");

        let updated = api.update_branch("b2", &form("Remera East")).await.unwrap();
        assert_eq!(updated.name, "Remera East");

        api.delete_branch("b2").await.unwrap();
    }
}
