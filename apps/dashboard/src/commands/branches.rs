//! # Manage Branch Commands
//!
//! Admin only. The guard runs before validation and before any request.

use tracing::debug;

use tally_core::authz::Screen;
use tally_core::validation::validate_branch_form;
use tally_core::{Branch, BranchForm};

use super::CsvExport;
use crate::error::ScreenError;
use crate::state::Dashboard;

pub async fn list_branches(app: &Dashboard) -> Result<Vec<Branch>, ScreenError> {
    app.enter(Screen::ManageBranch).await?;
    Ok(app.api().list_branches().await?)
}

pub async fn create_branch(app: &Dashboard, form: BranchForm) -> Result<Branch, ScreenError> {
    debug!(branch = %form.branch_name, "create_branch command");
    app.enter(Screen::ManageBranch).await?;
    validate_branch_form(&form)?;
    Ok(app.api().create_branch(&form).await?)
}

pub async fn update_branch(app: &Dashboard, id: String, form: BranchForm) -> Result<Branch, ScreenError> {
    debug!(branch_id = %id, "update_branch command");
    app.enter(Screen::ManageBranch).await?;
    validate_branch_form(&form)?;
    Ok(app.api().update_branch(&id, &form).await?)
}

pub async fn delete_branch(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(branch_id = %id, "delete_branch command");
    app.enter(Screen::ManageBranch).await?;
    Ok(app.api().delete_branch(&id).await?)
}

pub async fn export_branches(app: &Dashboard) -> Result<CsvExport, ScreenError> {
    let branches = list_branches(app).await?;
    CsvExport::render(&branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::TestApp;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn branch(id: &str, name: &str) -> Value {
        json!({"_id": id, "branchName": name, "district": "Gasabo", "sector": "Remera",
               "cell": "Rukiri", "village": "Amahoro"})
    }

    fn backend() -> Router {
        Router::new().route(
            "/branches",
            get(|| async { Json(json!({"success": true, "data": {"branches": [branch("b1", "Main")]}})) }).post(
                |Json(body): Json<Value>| async move {
                    let name = body["branchName"].as_str().unwrap_or_default().to_string();
                    Json(json!({"success": true, "data": {"branch": branch("b2", &name)}}))
                },
            ),
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
    async fn test_non_admin_is_denied_without_request() {
        let t = TestApp::with_backend(backend()).await;

        let err = list_branches(&t.app).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);

        t.login_staff().await;
        let err = create_branch(&t.app, form("Remera")).await.unwrap_err();
        assert!(err.is_access_denied());
        assert!(err.message.contains("Only admins can manage branches."));
        assert!(delete_branch(&t.app, "b1".into()).await.unwrap_err().is_access_denied());

        assert_eq!(t.hits(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_form_is_rejected_locally() {
        let t = TestApp::with_backend(backend()).await;
        t.login_admin().await;

        let mut incomplete = form("Remera");
        incomplete.village = " ".into();
        incomplete.cell.clear();
        let err = create_branch(&t.app, incomplete).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(t.hits(), 0);
    }

    #[tokio::test]
    async fn test_admin_lists_creates_and_exports() {
        let t = TestApp::with_backend(backend()).await;
        t.login_admin().await;

        assert_eq!(list_branches(&t.app).await.unwrap()[0].name, "Main");
        assert_eq!(create_branch(&t.app, form("Kicukiro")).await.unwrap().name, "Kicukiro");

        let export = export_branches(&t.app).await.unwrap();
        assert!(export.content.starts_with("\"Branch Name\""));
        assert!(export.content.contains("\"Main\""));
        assert_eq!(t.hits(), 3);
    }
}
