//! # tally-api: REST Client for the Tally Backend
//!
//! Typed async calls for every backend resource the dashboard touches.
//!
//! ## Resources
//! ```text
//! ┌──────────────┬─────────────────────────────────────────────────────────┐
//! │ branches     │ GET/POST /branches, GET/PUT/DELETE /branches/{id}       │
//! │ employees    │ GET/POST /users, PUT/DELETE /users/{id},                │
//! │              │ PUT /users/{id}/assign-branch | unassign-branch         │
//! │ products     │ GET/POST /products, PUT/DELETE /products/{id},          │
//! │              │ POST /products/{id}/sell                                │
//! │ sold         │ GET /sold, PUT /sold/{id}/payment                       │
//! │ restored     │ GET /restored, GET /restored/branches,                  │
//! │              │ PUT /restored/{id}/sell, DELETE /restored/{id}          │
//! │ trash        │ GET /trash, PUT /trash/{id}/restore, DELETE /trash/{id} │
//! │ reports      │ GET /reports/dashboard                                  │
//! │ profile      │ GET/PUT /profile, GET/PUT /profile/reports,             │
//! │              │ GET /profile/branches   (bare JSON, no envelope)        │
//! └──────────────┴─────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;

pub use client::{Anonymous, ApiClient, TokenSource};
pub use endpoints::products::SellReceipt;
pub use endpoints::profile::{ProfileBranch, ProfileDetails, ProfileUpdate};
pub use error::{ApiError, ApiResult, GENERIC_ERROR_MESSAGE};

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use axum::Router;
    use url::Url;

    use crate::client::{ApiClient, TokenSource};

    /// Token source returning a fixed value.
    pub struct FixedToken(pub Option<String>);

    impl TokenSource for FixedToken {
        async fn bearer_token(&self) -> crate::ApiResult<Option<String>> {
            Ok(self.0.clone())
        }
    }

    /// Serves `app` on an ephemeral local port.
    pub async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    pub fn client<T: TokenSource>(base: Url, tokens: T) -> ApiClient<T> {
        ApiClient::new(base, Duration::from_secs(5), tokens).unwrap()
    }
}
