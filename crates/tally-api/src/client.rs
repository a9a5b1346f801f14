//! # API Client
//!
//! One `reqwest` client per dashboard, plus a [`TokenSource`] asked for a
//! bearer token on every request.
//!
//! ```text
//! builder(GET, ["branches"])
//!     │  url = base + encoded segments
//!     │  token = tokens.bearer_token().await?   (refresh failure: ApiError::Token)
//!     ▼
//! send ──► non-2xx ──► ApiError::Backend{status, message | detail | generic}
//!     │
//!     ▼
//! envelope::decode / serde_json::from_str
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use tally_session::SessionHandle;

use crate::envelope::{self, ApiResponse};
use crate::error::{ApiError, ApiResult};

// =============================================================================
// Token Source
// =============================================================================

/// Supplies the bearer token for backend calls.
pub trait TokenSource: Send + Sync {
    /// `Ok(None)` sends the request without an `Authorization` header.
    /// An error aborts the request before it is sent.
    fn bearer_token(&self) -> impl Future<Output = ApiResult<Option<String>>> + Send;
}

impl TokenSource for SessionHandle {
    async fn bearer_token(&self) -> ApiResult<Option<String>> {
        SessionHandle::bearer_token(self)
            .await
            .map_err(|e| ApiError::Token(e.to_string()))
    }
}

/// Token source for unauthenticated calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    async fn bearer_token(&self) -> ApiResult<Option<String>> {
        Ok(None)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Typed client for the business backend.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_url: Url,
    http: Client,
    tokens: T,
}

impl<T: TokenSource> ApiClient<T> {
    pub fn new(base_url: Url, timeout: Duration, tokens: T) -> ApiResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;
        Ok(ApiClient {
            base_url,
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request builder carrying the bearer token, if any.
    pub(crate) async fn builder(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Backend request");
        let token = self.tokens.bearer_token().await?;
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<(u16, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = envelope::error_message_from_body(&body);
            warn!(status = status.as_u16(), message = ?message, "Backend call failed");
            return Err(ApiError::backend(status.as_u16(), message));
        }
        Ok((status.as_u16(), body))
    }

    /// Sends and decodes a `{success, data, message}` envelope.
    pub(crate) async fn send_envelope<D: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<D> {
        let (status, body) = self.send(request).await?;
        envelope::decode(&body, status)
    }

    /// Sends and decodes a bare JSON body.
    pub(crate) async fn send_raw<D: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<D> {
        let (_, body) = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Sends a call whose payload is not needed. An envelope with
    /// `success: false` still fails.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        let (status, body) = self.send(request).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<ApiResponse<serde_json::Value>>(&body) {
            Ok(response) if !response.success => Err(ApiError::backend(status, response.error_message())),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
