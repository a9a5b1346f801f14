//! # Manage Employees Commands
//!
//! Admin only.

use tracing::debug;

use tally_core::authz::Screen;
use tally_core::validation::validate_employee_form;
use tally_core::{Employee, EmployeeForm};

use super::CsvExport;
use crate::error::ScreenError;
use crate::state::Dashboard;

pub async fn list_employees(app: &Dashboard) -> Result<Vec<Employee>, ScreenError> {
    app.enter(Screen::ManageEmployees).await?;
    Ok(app.api().list_employees().await?)
}

/// New employees are created inactive; the role picker is optional here.
pub async fn create_employee(app: &Dashboard, form: EmployeeForm) -> Result<Employee, ScreenError> {
    debug!(username = %form.username, "create_employee command");
    app.enter(Screen::ManageEmployees).await?;
    validate_employee_form(&form, false)?;
    Ok(app.api().create_employee(&form).await?)
}

pub async fn update_employee(app: &Dashboard, id: String, form: EmployeeForm) -> Result<Employee, ScreenError> {
    debug!(employee_id = %id, "update_employee command");
    app.enter(Screen::ManageEmployees).await?;
    validate_employee_form(&form, true)?;
    Ok(app.api().update_employee(&id, &form).await?)
}

pub async fn delete_employee(app: &Dashboard, id: String) -> Result<(), ScreenError> {
    debug!(employee_id = %id, "delete_employee command");
    app.enter(Screen::ManageEmployees).await?;
    Ok(app.api().delete_employee(&id).await?)
}

pub async fn assign_branch(app: &Dashboard, employee_id: String, branch_id: String) -> Result<Employee, ScreenError> {
    app.enter(Screen::ManageEmployees).await?;
    if branch_id.trim().is_empty() {
        return Err(ScreenError::validation("Please select a branch."));
    }
    Ok(app.api().assign_branch(&employee_id, &branch_id).await?)
}

pub async fn unassign_branch(app: &Dashboard, employee_id: String) -> Result<Employee, ScreenError> {
    app.enter(Screen::ManageEmployees).await?;
    Ok(app.api().unassign_branch(&employee_id).await?)
}

pub async fn export_employees(app: &Dashboard) -> Result<CsvExport, ScreenError> {
    let employees = list_employees(app).await?;
    CsvExport::render(&employees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::TestApp;
    use axum::extract::Path;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tally_core::Role;

    fn user(id: &str, role: &str, active: bool) -> Value {
        json!({
            "_id": id, "username": "jhabimana", "email": "jean@shop.rw",
            "firstName": "Jean", "lastName": "Habimana", "phone": "+250788123456",
            "district": "Gasabo", "sector": "Remera", "cell": "Rukiri", "village": "Amahoro",
            "role": role, "isActive": active
        })
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/users",
                get(|| async { Json(json!({"success": true, "data": {"users": [user("e1", "staff", true)]}})) })
                    .post(|| async { Json(json!({"success": true, "data": {"user": user("e2", "staff", false)}})) }),
            )
            .route(
                "/users/{id}",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let role = body["role"].as_str().unwrap_or("staff").to_string();
                    Json(json!({"success": true, "data": {"user": user(&id, &role, true)}}))
                }),
            )
    }

    fn form() -> EmployeeForm {
        EmployeeForm {
            username: "jhabimana".into(),
            email: "jean@shop.rw".into(),
            first_name: "Jean".into(),
            last_name: "Habimana".into(),
            phone: "+250788123456".into(),
            district: "Gasabo".into(),
            sector: "Remera".into(),
            cell: "Rukiri".into(),
            village: "Amahoro".into(),
            ..EmployeeForm::default()
        }
    }

    #[tokio::test]
    async fn test_staff_is_denied_without_request() {
        let t = TestApp::with_backend(backend()).await;
        t.login_staff().await;

        let err = list_employees(&t.app).await.unwrap_err();
        assert!(err.is_access_denied());
        assert!(err.message.contains("Only admins can manage employees."));
        assert!(create_employee(&t.app, form()).await.unwrap_err().is_access_denied());
        assert!(assign_branch(&t.app, "e1".into(), "b1".into()).await.unwrap_err().is_access_denied());
        assert_eq!(t.hits(), 0);
    }

    #[tokio::test]
    async fn test_update_requires_role() {
        let t = TestApp::with_backend(backend()).await;
        t.login_admin().await;

        let err = update_employee(&t.app, "e1".into(), form()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(t.hits(), 0);

        let mut with_role = form();
        with_role.role = Some(Role::Admin);
        let updated = update_employee(&t.app, "e1".into(), with_role).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_create_and_export() {
        let t = TestApp::with_backend(backend()).await;
        t.login_admin().await;

        let mut bad_email = form();
        bad_email.email = "jean-at-shop".into();
        assert_eq!(
            create_employee(&t.app, bad_email).await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        let created = create_employee(&t.app, form()).await.unwrap();
        assert!(!created.is_active);

        let export = export_employees(&t.app).await.unwrap();
        assert_eq!(export.file_name, "employees.csv");
        assert!(export.content.contains("\"jean@shop.rw\""));
    }
}
