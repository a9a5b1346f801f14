//! # REST Identity Provider and Profile Store
//!
//! Talks to a hosted identity toolkit over HTTPS and reads profile records
//! from the profile service.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  IDENTITY ({identity_url})                                             │
//! │    POST /v1/accounts:signInWithPassword?key=K  email/password sign-in   │
//! │    POST /v1/accounts:signInWithIdp?key=K       federated credential     │
//! │    POST /v1/accounts:sendOobCode?key=K         password reset email     │
//! │                                                                         │
//! │  TOKENS ({token_url})                                                   │
//! │    POST /v1/token?key=K                        refresh (form encoded)   │
//! │                                                                         │
//! │  PROFILES ({profile_url}, bearer = id token)                            │
//! │    GET  /users/{uid}                           404 = absent record      │
//! │    GET  /businesses/{id}                       404 = absent business    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tokens live in memory only. The id token is refreshed 5 minutes before it
//! expires, or on demand.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use tally_core::Business;

use crate::error::{ProfileStoreError, ProviderError, ProviderErrorCode, SessionError, SessionResult};
use crate::profile::{ProfileRecord, ProfileStore};
use crate::provider::{IdentityProvider, Principal};

/// Margin before id-token expiration that triggers a refresh.
const REFRESH_MARGIN_SECS: i64 = 300;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct RestIdentityConfig {
    /// Identity toolkit base, e.g. `https://identitytoolkit.googleapis.com`.
    pub identity_url: Url,
    /// Secure token base, e.g. `https://securetoken.googleapis.com`.
    pub token_url: Url,
    pub api_key: String,
    pub timeout: Duration,
}

fn build_client(timeout: Duration) -> SessionResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SessionError::InvalidConfig(format!("HTTP client: {e}")))
}

// =============================================================================
// Federated Consent
// =============================================================================

/// Credential handed back by a third-party consent flow.
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// e.g. `google.com`
    pub provider_id: String,
    pub id_token: String,
}

/// Drives the consent window of a federated provider.
///
/// Failures use [`ProviderErrorCode::PopupClosed`] and
/// [`ProviderErrorCode::PopupBlocked`] for the two user-visible cases.
pub trait ConsentFlow: Send + Sync + 'static {
    fn obtain_credential(&self) -> impl Future<Output = Result<FederatedCredential, ProviderError>> + Send;
}

/// Consent flow for deployments without federated sign-in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConsent;

impl ConsentFlow for NoConsent {
    async fn obtain_credential(&self) -> Result<FederatedCredential, ProviderError> {
        Err(ProviderError::new(
            ProviderErrorCode::PopupBlocked,
            "federated sign-in is not configured",
        ))
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignIn<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignIn {
    post_body: String,
    request_uri: String,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps an identity-toolkit error message to a provider code.
///
/// Messages look like `EMAIL_NOT_FOUND` or
/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access temporarily disabled`.
fn classify(message: &str) -> ProviderErrorCode {
    let key = message.split(':').next().unwrap_or_default().trim();
    match key {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => ProviderErrorCode::NotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => ProviderErrorCode::WrongSecret,
        "INVALID_EMAIL" | "MISSING_EMAIL" => ProviderErrorCode::MalformedEmail,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => ProviderErrorCode::RateLimited,
        "TOKEN_EXPIRED" | "USER_DISABLED" | "INVALID_REFRESH_TOKEN" => ProviderErrorCode::SessionExpired,
        _ => ProviderErrorCode::Other,
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {status}"));
    Err(ProviderError::new(classify(&message), message))
}

// =============================================================================
// Token Storage
// =============================================================================

#[derive(Debug, Clone)]
struct TokenInfo {
    principal: Principal,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenInfo {
    fn needs_refresh(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

fn expiry(expires_in: &str) -> DateTime<Utc> {
    let secs = expires_in.trim().parse::<i64>().unwrap_or(3600);
    Utc::now() + chrono::Duration::seconds(secs)
}

// =============================================================================
// Identity Provider
// =============================================================================

/// Identity provider backed by the identity-toolkit REST API.
pub struct RestIdentityProvider<C = NoConsent> {
    config: RestIdentityConfig,
    client: Client,
    consent: C,
    token: Arc<RwLock<Option<TokenInfo>>>,
    state_tx: watch::Sender<Option<Principal>>,
}

impl RestIdentityProvider<NoConsent> {
    pub fn new(config: RestIdentityConfig) -> SessionResult<Self> {
        Self::with_consent(config, NoConsent)
    }
}

impl<C: ConsentFlow> RestIdentityProvider<C> {
    pub fn with_consent(config: RestIdentityConfig, consent: C) -> SessionResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(SessionError::InvalidConfig("identity api key is empty".into()));
        }
        let (state_tx, _) = watch::channel(None);
        Ok(RestIdentityProvider {
            client: build_client(config.timeout)?,
            config,
            consent,
            token: Arc::new(RwLock::new(None)),
            state_tx,
        })
    }

    fn identity_endpoint(&self, method: &str) -> Result<Url, ProviderError> {
        let mut url = self
            .config
            .identity_url
            .join(&format!("v1/accounts:{method}"))
            .map_err(|e| ProviderError::new(ProviderErrorCode::Other, e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    fn token_endpoint(&self) -> Result<Url, ProviderError> {
        let mut url = self
            .config
            .token_url
            .join("v1/token")
            .map_err(|e| ProviderError::new(ProviderErrorCode::Other, e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn store_session(&self, response: SignInResponse) -> Principal {
        let principal = Principal {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name,
            photo_url: response.photo_url,
            id_token: response.id_token,
        };
        *self.token.write().await = Some(TokenInfo {
            principal: principal.clone(),
            refresh_token: response.refresh_token,
            expires_at: expiry(&response.expires_in),
        });
        self.state_tx.send_replace(Some(principal.clone()));
        principal
    }

    async fn clear_session(&self) {
        *self.token.write().await = None;
        self.state_tx.send_replace(None);
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ProviderError> {
        let response = self
            .client
            .post(self.token_endpoint()?)
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;
        read_json(response).await
    }
}

impl<C: ConsentFlow> IdentityProvider for RestIdentityProvider<C> {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Principal, ProviderError> {
        debug!("Signing in with password");
        let response = self
            .client
            .post(self.identity_endpoint("signInWithPassword")?)
            .json(&PasswordSignIn {
                email,
                password: secret,
                return_secure_token: true,
            })
            .send()
            .await?;
        let body: SignInResponse = read_json(response).await?;
        let principal = self.store_session(body).await;
        info!(uid = %principal.uid, "Signed in with identity provider");
        Ok(principal)
    }

    async fn sign_in_federated(&self) -> Result<Principal, ProviderError> {
        let credential = self.consent.obtain_credential().await?;
        debug!(provider = %credential.provider_id, "Exchanging federated credential");

        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", &credential.id_token)
            .append_pair("providerId", &credential.provider_id)
            .finish();
        let response = self
            .client
            .post(self.identity_endpoint("signInWithIdp")?)
            .json(&IdpSignIn {
                post_body,
                request_uri: "http://localhost".to_string(),
                return_secure_token: true,
            })
            .send()
            .await?;
        let body: SignInResponse = read_json(response).await?;
        Ok(self.store_session(body).await)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.clear_session().await;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.identity_endpoint("sendOobCode")?)
            .json(&OobRequest {
                request_type: "PASSWORD_RESET",
                email,
            })
            .send()
            .await?;
        read_json::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn current_token(&self, force_refresh: bool) -> Result<Option<String>, ProviderError> {
        let current = match self.token.read().await.clone() {
            Some(info) => info,
            None => return Ok(None),
        };
        if !force_refresh && !current.needs_refresh() {
            return Ok(Some(current.principal.id_token));
        }

        match self.refresh(&current.refresh_token).await {
            Ok(refreshed) => {
                let mut guard = self.token.write().await;
                let Some(info) = guard.as_mut() else {
                    // Signed out while the refresh was in flight.
                    return Ok(None);
                };
                info.principal.id_token = refreshed.id_token.clone();
                info.refresh_token = refreshed.refresh_token;
                info.expires_at = expiry(&refreshed.expires_in);
                debug!("Id token refreshed");
                Ok(Some(refreshed.id_token))
            }
            Err(e) if e.code == ProviderErrorCode::SessionExpired => {
                warn!(error = %e, "Provider session revoked");
                self.clear_session().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn auth_state(&self) -> watch::Receiver<Option<Principal>> {
        self.state_tx.subscribe()
    }
}

// =============================================================================
// Profile Store
// =============================================================================

/// Profile store backed by the profile service.
#[derive(Debug, Clone)]
pub struct RestProfileStore {
    base_url: Url,
    client: Client,
}

impl RestProfileStore {
    pub fn new(base_url: Url, timeout: Duration) -> SessionResult<Self> {
        Ok(RestProfileStore {
            base_url,
            client: build_client(timeout)?,
        })
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(
        &self,
        principal: &Principal,
        path: &str,
    ) -> Result<Option<T>, ProfileStoreError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ProfileStoreError::Transport(e.to_string()))?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&principal.id_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<T>().await?)),
            status => Err(ProfileStoreError::Transport(format!("HTTP {status}"))),
        }
    }
}

impl ProfileStore for RestProfileStore {
    async fn get_profile(&self, principal: &Principal) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        self.fetch(principal, &format!("users/{}", principal.uid)).await
    }

    async fn get_business(
        &self,
        principal: &Principal,
        business_id: &str,
    ) -> Result<Option<Business>, ProfileStoreError> {
        self.fetch(principal, &format!("businesses/{business_id}")).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn error(message: &str) -> (AxumStatus, Json<Value>) {
        (
            AxumStatus::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": message}})),
        )
    }

    async fn password_sign_in(
        Query(q): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> (AxumStatus, Json<Value>) {
        if q.get("key").map(String::as_str) != Some("test-key") {
            return error("API_KEY_INVALID");
        }
        match (body["email"].as_str(), body["password"].as_str()) {
            (Some("owner@shop.rw"), Some("secret")) => (
                AxumStatus::OK,
                Json(json!({
                    "localId": "u1",
                    "email": "owner@shop.rw",
                    "idToken": "id-1",
                    "refreshToken": "refresh-1",
                    "expiresIn": "3600"
                })),
            ),
            (Some("owner@shop.rw"), _) => error("INVALID_PASSWORD"),
            (Some("busy@shop.rw"), _) => error("TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled"),
            _ => error("EMAIL_NOT_FOUND"),
        }
    }

    async fn refresh_token(body: String) -> (AxumStatus, Json<Value>) {
        if body.contains("refresh_token=refresh-1") {
            (
                AxumStatus::OK,
                Json(json!({
                    "id_token": "id-2",
                    "refresh_token": "refresh-2",
                    "expires_in": "3600",
                    "user_id": "u1"
                })),
            )
        } else {
            error("TOKEN_EXPIRED")
        }
    }

    async fn identity_server() -> Url {
        let app = Router::new()
            .route("/v1/accounts:signInWithPassword", post(password_sign_in))
            .route(
                "/v1/accounts:sendOobCode",
                post(|Json(body): Json<Value>| async move {
                    if body["requestType"] == "PASSWORD_RESET" && body["email"] == "owner@shop.rw" {
                        (AxumStatus::OK, Json(json!({"email": "owner@shop.rw"})))
                    } else {
                        error("EMAIL_NOT_FOUND")
                    }
                }),
            )
            .route("/v1/token", post(refresh_token));
        serve(app).await
    }

    async fn provider() -> RestIdentityProvider {
        let base = identity_server().await;
        RestIdentityProvider::new(RestIdentityConfig {
            identity_url: base.clone(),
            token_url: base,
            api_key: "test-key".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_classify_messages() {
        assert_eq!(classify("EMAIL_NOT_FOUND"), ProviderErrorCode::NotFound);
        assert_eq!(classify("INVALID_PASSWORD"), ProviderErrorCode::WrongSecret);
        assert_eq!(
            classify("TOO_MANY_ATTEMPTS_TRY_LATER : Access temporarily disabled"),
            ProviderErrorCode::RateLimited
        );
        assert_eq!(classify("INVALID_EMAIL"), ProviderErrorCode::MalformedEmail);
        assert_eq!(classify("WEAK_PASSWORD"), ProviderErrorCode::Other);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let base = Url::parse("http://localhost/").unwrap();
        let result = RestIdentityProvider::new(RestIdentityConfig {
            identity_url: base.clone(),
            token_url: base,
            api_key: " ".into(),
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_password_sign_in_and_refresh() {
        let provider = provider().await;
        let mut rx = provider.auth_state();

        let principal = provider.sign_in("owner@shop.rw", "secret").await.unwrap();
        assert_eq!(principal.uid, "u1");
        assert_eq!(principal.id_token, "id-1");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|p| p.uid.as_str()), Some("u1"));

        assert_eq!(provider.current_token(false).await.unwrap().as_deref(), Some("id-1"));
        assert_eq!(provider.current_token(true).await.unwrap().as_deref(), Some("id-2"));

        provider.sign_out().await.unwrap();
        assert_eq!(provider.current_token(true).await.unwrap(), None);
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_revoked_refresh_token_ends_session() {
        let provider = provider().await;
        provider.sign_in("owner@shop.rw", "secret").await.unwrap();
        provider.current_token(true).await.unwrap();

        // refresh-2 is unknown to the fake server.
        assert_eq!(provider.current_token(true).await.unwrap(), None);
        assert!(provider.auth_state().borrow().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_error_codes() {
        let provider = provider().await;
        let wrong = provider.sign_in("owner@shop.rw", "nope").await.unwrap_err();
        assert_eq!(wrong.code, ProviderErrorCode::WrongSecret);
        let missing = provider.sign_in("ghost@shop.rw", "secret").await.unwrap_err();
        assert_eq!(missing.code, ProviderErrorCode::NotFound);
        let busy = provider.sign_in("busy@shop.rw", "secret").await.unwrap_err();
        assert_eq!(busy.code, ProviderErrorCode::RateLimited);
    }

    #[tokio::test]
    async fn test_password_reset() {
        let provider = provider().await;
        provider.send_password_reset("owner@shop.rw").await.unwrap();
        let err = provider.send_password_reset("ghost@shop.rw").await.unwrap_err();
        assert_eq!(err.code, ProviderErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_federated_without_consent_is_blocked() {
        let provider = provider().await;
        let err = provider.sign_in_federated().await.unwrap_err();
        assert_eq!(err.code, ProviderErrorCode::PopupBlocked);
    }

    #[tokio::test]
    async fn test_profile_store() {
        let app = Router::new()
            .route(
                "/users/{uid}",
                get(|Path(uid): Path<String>, headers: axum::http::HeaderMap| async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer id-1");
                    if !authorized {
                        return (AxumStatus::UNAUTHORIZED, Json(json!({})));
                    }
                    if uid == "u1" {
                        (
                            AxumStatus::OK,
                            Json(json!({
                                "firstName": "Aline",
                                "lastName": "Uwase",
                                "email": "owner@shop.rw",
                                "role": "admin",
                                "isActive": true,
                                "businessId": "biz1"
                            })),
                        )
                    } else {
                        (AxumStatus::NOT_FOUND, Json(json!({})))
                    }
                }),
            )
            .route(
                "/businesses/{id}",
                get(|Path(id): Path<String>| async move {
                    (
                        AxumStatus::OK,
                        Json(json!({"_id": id, "name": "Kigali Hardware", "plan": "pro"})),
                    )
                }),
            );
        let store = RestProfileStore::new(serve(app).await, Duration::from_secs(5)).unwrap();

        let mut principal = Principal {
            uid: "u1".into(),
            email: None,
            display_name: None,
            photo_url: None,
            id_token: "id-1".into(),
        };
        let record = store.get_profile(&principal).await.unwrap().unwrap();
        assert_eq!(record.business_id.as_deref(), Some("biz1"));

        let business = store.get_business(&principal, "biz1").await.unwrap().unwrap();
        assert_eq!(business.name, "Kigali Hardware");

        principal.uid = "u2".into();
        assert!(store.get_profile(&principal).await.unwrap().is_none());

        principal.id_token = "stale".into();
        assert!(matches!(
            store.get_profile(&principal).await,
            Err(ProfileStoreError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_wrongly_typed_record_forces_sign_out() {
        use crate::error::AuthError;
        use crate::manager::{SessionManager, SessionState};
        use crate::memory::MemoryIdentityProvider;

        let app = Router::new().route(
            "/users/{uid}",
            get(|Path(uid): Path<String>| async move {
                let body = match uid.as_str() {
                    "u1" => json!({
                        "firstName": "Aline", "lastName": "Uwase", "email": "owner@shop.rw",
                        "role": 7, "isActive": true
                    }),
                    _ => json!({
                        "firstName": ["Jean"], "lastName": "Habimana", "email": "jean@shop.rw",
                        "role": "staff", "isActive": true
                    }),
                };
                Json(body)
            }),
        );
        let store = Arc::new(RestProfileStore::new(serve(app).await, Duration::from_secs(5)).unwrap());
        let provider = Arc::new(MemoryIdentityProvider::new());
        provider.add_account("owner@shop.rw", "secret", "u1").await;
        provider.add_account("jean@shop.rw", "secret", "u2").await;

        let handle = SessionManager::new(provider.clone(), store).start();
        handle.wait_until_resolved().await;

        let err = handle.try_login("owner@shop.rw", "secret").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidRole);
        assert_eq!(handle.state().await, SessionState::Unauthenticated);
        assert!(provider.current_principal().is_none());

        let err = handle.try_login("jean@shop.rw", "secret").await.unwrap_err();
        assert_eq!(err, AuthError::ProfileMalformed);
        assert!(provider.current_principal().is_none());
        assert_eq!(provider.sign_out_calls(), 2);
    }
}
