//! # Identity Provider Seam
//!
//! The external service that verifies credentials, issues bearer tokens and
//! reports auth-state changes. The session manager only ever talks to it
//! through [`IdentityProvider`].

use std::fmt;
use std::future::Future;

use tokio::sync::watch;

use crate::error::ProviderError;

/// An authenticated identity as the provider reports it.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Provider-assigned id. Also the profile record key.
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Token issued at sign-in. Used for the profile fetch that follows.
    pub id_token: String,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

/// Identity provider operations.
///
/// `auth_state` is the provider's own view of who is signed in. It changes on
/// sign-in, sign-out and when a session is revoked outside the dashboard.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Email/password sign-in.
    fn sign_in(
        &self,
        email: &str,
        secret: &str,
    ) -> impl Future<Output = Result<Principal, ProviderError>> + Send;

    /// Sign-in through a third-party consent window.
    fn sign_in_federated(&self) -> impl Future<Output = Result<Principal, ProviderError>> + Send;

    /// Revokes the provider session. Safe to call when nobody is signed in.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn send_password_reset(&self, email: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Current bearer token, refreshed first when `force_refresh` is set.
    /// `Ok(None)` when nobody is signed in.
    fn current_token(
        &self,
        force_refresh: bool,
    ) -> impl Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// Subscribes to auth-state changes.
    fn auth_state(&self) -> watch::Receiver<Option<Principal>>;
}
