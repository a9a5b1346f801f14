//! Employee management endpoints (`/users`).

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use tally_core::{Employee, EmployeeForm};

use crate::client::{ApiClient, TokenSource};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
struct EmployeeList {
    users: Vec<Employee>,
}

#[derive(Debug, Deserialize)]
struct EmployeeOne {
    user: Employee,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBranch<'a> {
    branch_id: &'a str,
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn list_employees(&self) -> ApiResult<Vec<Employee>> {
        let req = self.builder(Method::GET, &["users"]).await?;
        Ok(self.send_envelope::<EmployeeList>(req).await?.users)
    }

    pub async fn create_employee(&self, form: &EmployeeForm) -> ApiResult<Employee> {
        let req = self.builder(Method::POST, &["users"]).await?.json(form);
        let user = self.send_envelope::<EmployeeOne>(req).await?.user;
        info!(employee_id = %user.id, role = %user.role, "Employee created");
        Ok(user)
    }

    pub async fn update_employee(&self, id: &str, form: &EmployeeForm) -> ApiResult<Employee> {
        let req = self.builder(Method::PUT, &["users", id]).await?.json(form);
        Ok(self.send_envelope::<EmployeeOne>(req).await?.user)
    }

    pub async fn delete_employee(&self, id: &str) -> ApiResult<()> {
        let req = self.builder(Method::DELETE, &["users", id]).await?;
        self.send_empty(req).await?;
        info!(employee_id = %id, "Employee deleted");
        Ok(())
    }

    pub async fn assign_branch(&self, employee_id: &str, branch_id: &str) -> ApiResult<Employee> {
        let req = self
            .builder(Method::PUT, &["users", employee_id, "assign-branch"])
            .await?
            .json(&AssignBranch { branch_id });
        Ok(self.send_envelope::<EmployeeOne>(req).await?.user)
    }

    pub async fn unassign_branch(&self, employee_id: &str) -> ApiResult<Employee> {
        let req = self
            .builder(Method::PUT, &["users", employee_id, "unassign-branch"])
            .await?
            .json(&serde_json::json!({}));
        Ok(self.send_envelope::<EmployeeOne>(req).await?.user)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{client, serve, FixedToken};
    use axum::extract::Path;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tally_core::{EmployeeForm, Role};

    fn user(id: &str, branch: Value) -> Value {
        json!({
            "_id": id,
            "username": "jhabimana",
            "email": "jean@shop.rw",
            "firstName": "Jean",
            "lastName": "Habimana",
            "phone": "+250788123456",
            "district": "Gasabo",
            "sector": "Remera",
            "cell": "Rukiri",
            "village": "Amahoro",
            "role": "staff",
            "branch": branch,
            "isActive": true,
            "imagephoto": "https://img/j.png"
        })
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/users",
                get(|| async {
                    Json(json!({"success": true, "data": {"users": [user("e1", json!({"_id": "b1", "branchName": "Main"}))]}}))
                })
                .post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["role"], "staff");
                    assert!(body.get("isActive").is_none());
                    Json(json!({"success": true, "data": {"user": user("e2", Value::Null)}, "message": "Employee created successfully!"}))
                }),
            )
            .route(
                "/users/{id}/assign-branch",
                put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let branch_id = body["branchId"].clone();
                    let branch = json!({"_id": branch_id, "branchName": "Remera"});
                    Json(json!({"success": true, "data": {"user": user(&id, branch)}}))
                }),
            )
            .route(
                "/users/{id}/unassign-branch",
                put(|Path(id): Path<String>| async move {
                    Json(json!({"success": true, "data": {"user": user(&id, Value::Null)}}))
                }),
            )
            .route(
                "/users/{id}",
                put(|Path(id): Path<String>, Json(_): Json<Value>| async move {
                    Json(json!({"success": true, "data": {"user": user(&id, Value::Null)}}))
                })
                .delete(|| async { Json(json!({"success": true})) }),
            )
    }

    #[tokio::test]
    async fn test_employee_calls() {
        let api = client(serve(app()).await, FixedToken(Some("t".into())));

        let users = api.list_employees().await.unwrap();
        assert_eq!(users[0].branch_name(), Some("Main"));
        assert_eq!(users[0].profile_image.as_deref(), Some("https://img/j.png"));

        let form = EmployeeForm {
            username: "jhabimana".into(),
            email: "jean@shop.rw".into(),
            first_name: "Jean".into(),
            last_name: "Habimana".into(),
            role: Some(Role::Staff),
            ..EmployeeForm::default()
        };
        let created = api.create_employee(&form).await.unwrap();
        assert_eq!(created.id, "e2");
        assert!(created.branch.is_none());

        let assigned = api.assign_branch("e2", "b2").await.unwrap();
        assert_eq!(assigned.branch.map(|b| b.id).as_deref(), Some("b2"));
        let unassigned = api.unassign_branch("e2").await.unwrap();
        assert!(unassigned.branch.is_none());

        api.update_employee("e2", &form).await.unwrap();
        api.delete_employee("e2").await.unwrap();
    }
}
