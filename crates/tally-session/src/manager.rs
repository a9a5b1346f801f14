//! # Session Manager
//!
//! Reconciles identity-provider events with the business profile and
//! publishes a single [`SessionState`].
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  ┌──────────┐  provider reports nobody   ┌──────────────────┐          │
//! │  │ Unknown  │ ─────────────────────────▶ │ Unauthenticated  │◀──┐      │
//! │  └────┬─────┘                            └────────┬─────────┘   │      │
//! │       │ provider reports principal                │ login       │      │
//! │       ▼                                           ▼             │      │
//! │  ┌────────────────┐   profile invalid    ┌──────────────────┐   │      │
//! │  │ Authenticating │ ───────────────────▶ │ sign_out + error │───┘      │
//! │  └───────┬────────┘                      └──────────────────┘          │
//! │          │ profile valid                                               │
//! │          ▼                                                              │
//! │  ┌────────────────┐   logout / revoked elsewhere                        │
//! │  │ Authenticated  │ ──────────────────────────────▶ Unauthenticated     │
//! │  └────────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! One task owns the state. It selects over the provider's auth-state channel
//! and the handle's command channel, so a provider event and a login never
//! interleave. A principal is only ever published as `Authenticated` after its
//! profile has been fetched and validated in that same task.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{debug, info, warn};

use tally_core::validation::validate_email;
use tally_core::{Capabilities, ProfilePatch, Role, UserProfile};

use crate::error::{AuthError, ProviderError, SessionError, SessionResult};
use crate::profile::{load_profile, ProfileStore};
use crate::provider::{IdentityProvider, Principal};

// =============================================================================
// State
// =============================================================================

/// A principal with its validated profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub principal: Principal,
    pub profile: UserProfile,
}

/// Published session state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Provider has not reported yet.
    #[default]
    Unknown,
    /// A principal is being validated.
    Authenticating,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.session().map(|s| &s.profile)
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|p| p.role)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Whether the state is settled. Screens wait for this before routing.
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionState::Authenticated(_) | SessionState::Unauthenticated)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_role(self.role())
    }
}

/// Snapshot of the session for the web shell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub loading: bool,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
    pub is_admin: bool,
    pub is_staff: bool,
    pub can_sell: bool,
}

// =============================================================================
// Commands & Handle
// =============================================================================

/// Commands for the session task.
enum SessionCommand {
    Login {
        email: String,
        secret: String,
        reply: oneshot::Sender<Result<Session, AuthError>>,
    },
    FederatedLogin {
        reply: oneshot::Sender<Result<Session, AuthError>>,
    },
    Logout {
        reply: oneshot::Sender<()>,
    },
    ResetPassword {
        email: String,
        reply: oneshot::Sender<Result<(), AuthError>>,
    },
    Token {
        force_refresh: bool,
        reply: oneshot::Sender<Result<Option<String>, ProviderError>>,
    },
    UpdateUser {
        patch: ProfilePatch,
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

/// Cloneable handle to a running session manager.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
    last_error: Arc<RwLock<Option<String>>>,
    state_rx: watch::Receiver<SessionState>,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand) -> SessionResult<T> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply))
            .await
            .map_err(|_| SessionError::ChannelError("Session command channel closed".into()))?;
        rx.await
            .map_err(|_| SessionError::ChannelError("Session task dropped the reply".into()))
    }

    /// Signs in with email and secret. Returns true when the session is
    /// authenticated; otherwise the reason is in [`Self::error_message`].
    pub async fn login(&self, email: &str, secret: &str) -> bool {
        self.try_login(email, secret).await.is_ok()
    }

    /// Like [`Self::login`] but returns the session or the failure.
    pub async fn try_login(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_string();
        let secret = secret.to_string();
        self.request(|reply| SessionCommand::Login { email, secret, reply })
            .await
            .map_err(|_| AuthError::SessionClosed)?
    }

    pub async fn login_with_federated_provider(&self) -> bool {
        self.try_login_with_federated_provider().await.is_ok()
    }

    pub async fn try_login_with_federated_provider(&self) -> Result<Session, AuthError> {
        self.request(|reply| SessionCommand::FederatedLogin { reply })
            .await
            .map_err(|_| AuthError::SessionClosed)?
    }

    /// Signs out. Idempotent.
    pub async fn logout(&self) -> SessionResult<()> {
        self.request(|reply| SessionCommand::Logout { reply }).await
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_string();
        self.request(|reply| SessionCommand::ResetPassword { email, reply })
            .await
            .map_err(|_| AuthError::SessionClosed)?
    }

    /// Bearer token for backend calls. The provider refreshes it when it
    /// is close to expiry.
    ///
    /// `Ok(None)` whenever the session is not authenticated. A failed
    /// refresh is an error, never a missing token.
    pub async fn bearer_token(&self) -> SessionResult<Option<String>> {
        self.request(|reply| SessionCommand::Token {
            force_refresh: false,
            reply,
        })
        .await?
        .map_err(SessionError::Provider)
    }

    /// Applies a local profile patch. False when nobody is signed in.
    pub async fn update_user(&self, patch: ProfilePatch) -> bool {
        self.request(|reply| SessionCommand::UpdateUser { patch, reply })
            .await
            .unwrap_or(false)
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.read().await.profile().cloned()
    }

    pub async fn capabilities(&self) -> Capabilities {
        self.state.read().await.capabilities()
    }

    /// Message of the last failed operation, if not cleared since.
    pub async fn error_message(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.last_error.write().await = None;
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state().await;
        let caps = state.capabilities();
        SessionSnapshot {
            loading: !state.is_resolved(),
            user: state.profile().cloned(),
            error: self.error_message().await,
            is_admin: caps.is_admin,
            is_staff: caps.is_staff,
            can_sell: caps.can_sell,
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Waits until the state is no longer loading.
    pub async fn wait_until_resolved(&self) -> SessionState {
        let mut rx = self.state_rx.clone();
        let resolved = rx.wait_for(SessionState::is_resolved).await.map(|state| state.clone());
        match resolved {
            Ok(state) => state,
            Err(_) => self.state().await,
        }
    }

    /// Stops the session task.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.cmd_tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelError("Session command channel closed".into()))
    }
}

// =============================================================================
// Manager
// =============================================================================

/// The session manager task. Build with [`SessionManager::new`] and start
/// with [`SessionManager::start`].
pub struct SessionManager<P, S> {
    provider: Arc<P>,
    profiles: Arc<S>,
    state: Arc<RwLock<SessionState>>,
    last_error: Arc<RwLock<Option<String>>>,
    /// Uid whose profile last failed validation. Provider events for it are
    /// not re-validated until the next explicit sign-in.
    rejected_uid: RwLock<Option<String>>,
    state_tx: watch::Sender<SessionState>,
}

impl<P: IdentityProvider, S: ProfileStore> SessionManager<P, S> {
    pub fn new(provider: Arc<P>, profiles: Arc<S>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Unknown);
        SessionManager {
            provider,
            profiles,
            state: Arc::new(RwLock::new(SessionState::Unknown)),
            last_error: Arc::new(RwLock::new(None)),
            rejected_uid: RwLock::new(None),
            state_tx,
        }
    }

    /// Spawns the session task and returns a handle.
    pub fn start(self) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let handle = SessionHandle {
            state: self.state.clone(),
            last_error: self.last_error.clone(),
            state_rx: self.state_tx.subscribe(),
            cmd_tx,
        };

        tokio::spawn(async move {
            self.run(cmd_rx).await;
        });

        handle
    }

    async fn run(self, mut cmd_rx: mpsc::Receiver<SessionCommand>) {
        info!("Session manager started");

        let mut auth_rx = self.provider.auth_state();
        let mut provider_alive = true;

        let initial = auth_rx.borrow_and_update().clone();
        self.on_principal(initial).await;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) | None => {
                            info!("Session manager shutting down");
                            break;
                        }
                        Some(cmd) => self.handle(cmd).await,
                    }
                }
                changed = auth_rx.changed(), if provider_alive => {
                    if changed.is_err() {
                        warn!("Identity provider closed its auth-state channel");
                        provider_alive = false;
                        continue;
                    }
                    let principal = auth_rx.borrow_and_update().clone();
                    self.on_principal(principal).await;
                }
            }
        }
    }

    async fn handle(&self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Login { email, secret, reply } => {
                let result = self.login(&email, &secret).await;
                let _ = reply.send(result);
            }
            SessionCommand::FederatedLogin { reply } => {
                let result = self.federated_login().await;
                let _ = reply.send(result);
            }
            SessionCommand::Logout { reply } => {
                self.logout().await;
                let _ = reply.send(());
            }
            SessionCommand::ResetPassword { email, reply } => {
                let result = self.reset_password(&email).await;
                let _ = reply.send(result);
            }
            SessionCommand::Token { force_refresh, reply } => {
                let _ = reply.send(self.token(force_refresh).await);
            }
            SessionCommand::UpdateUser { patch, reply } => {
                let _ = reply.send(self.update_user(patch).await);
            }
            SessionCommand::Shutdown => {}
        }
    }

    // =========================================================================
    // State Publication
    // =========================================================================

    async fn publish(&self, next: SessionState) {
        *self.state.write().await = next.clone();
        self.state_tx.send_replace(next);
    }

    async fn set_error(&self, message: Option<String>) {
        *self.last_error.write().await = message;
    }

    async fn fail(&self, err: AuthError) -> AuthError {
        self.set_error(Some(err.to_string())).await;
        self.publish(SessionState::Unauthenticated).await;
        err
    }

    /// Records a rejected sign-in attempt and puts back the state held
    /// before it. The provider session, if any, was never replaced.
    async fn abandon(&self, previous: SessionState, err: AuthError) -> AuthError {
        self.set_error(Some(err.to_string())).await;
        let restored = if previous.is_resolved() {
            previous
        } else {
            SessionState::Unauthenticated
        };
        self.publish(restored).await;
        err
    }

    // =========================================================================
    // Provider Events
    // =========================================================================

    async fn on_principal(&self, principal: Option<Principal>) {
        let current = self.state.read().await.clone();
        match principal {
            Some(principal) => {
                if let Some(session) = current.session() {
                    if session.principal.uid == principal.uid {
                        return;
                    }
                }
                if self.rejected_uid.read().await.as_deref() == Some(principal.uid.as_str()) {
                    return;
                }
                debug!(uid = %principal.uid, "Provider reported a principal");
                let _ = self.establish(principal).await;
            }
            None => {
                if current != SessionState::Unauthenticated {
                    if current.is_authenticated() {
                        info!("Provider session ended");
                    }
                    self.publish(SessionState::Unauthenticated).await;
                }
            }
        }
    }

    /// Validates the principal's profile and publishes the outcome.
    async fn establish(&self, principal: Principal) -> Result<Session, AuthError> {
        self.publish(SessionState::Authenticating).await;

        match load_profile(self.profiles.as_ref(), &principal).await {
            Ok(profile) => {
                info!(uid = %principal.uid, role = %profile.role, "Session authenticated");
                let session = Session { principal, profile };
                *self.rejected_uid.write().await = None;
                self.set_error(None).await;
                self.publish(SessionState::Authenticated(session.clone())).await;
                Ok(session)
            }
            Err(err) => {
                warn!(uid = %principal.uid, error = %err, "Profile rejected");
                *self.rejected_uid.write().await = Some(principal.uid.clone());
                if err.forces_sign_out() {
                    if let Err(e) = self.provider.sign_out().await {
                        warn!(error = %e, "Provider sign-out failed after profile rejection");
                    }
                }
                Err(self.fail(err).await)
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        let previous = self.state.read().await.clone();
        if validate_email(email).is_err() {
            return Err(self.abandon(previous, AuthError::UseEmail).await);
        }

        self.publish(SessionState::Authenticating).await;
        match self.provider.sign_in(email, secret).await {
            Ok(principal) => self.establish(principal).await,
            Err(e) => {
                debug!(code = ?e.code, "Sign-in rejected by provider");
                Err(self.abandon(previous, AuthError::from_sign_in(&e)).await)
            }
        }
    }

    async fn federated_login(&self) -> Result<Session, AuthError> {
        let previous = self.state.read().await.clone();
        self.publish(SessionState::Authenticating).await;
        match self.provider.sign_in_federated().await {
            Ok(principal) => self.establish(principal).await,
            Err(e) => {
                debug!(code = ?e.code, "Federated sign-in failed");
                Err(self.abandon(previous, AuthError::from_federated(&e)).await)
            }
        }
    }

    async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "Provider sign-out failed");
        }
        *self.rejected_uid.write().await = None;
        self.set_error(None).await;
        if *self.state.read().await != SessionState::Unauthenticated {
            info!("Signed out");
            self.publish(SessionState::Unauthenticated).await;
        }
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let result = if validate_email(email).is_err() {
            Err(AuthError::InvalidEmail)
        } else {
            self.provider
                .send_password_reset(email)
                .await
                .map_err(|e| AuthError::from_reset(&e))
        };
        match &result {
            Ok(()) => {
                info!("Password reset email sent");
                self.set_error(None).await;
            }
            Err(err) => self.set_error(Some(err.to_string())).await,
        }
        result
    }

    async fn token(&self, force_refresh: bool) -> Result<Option<String>, ProviderError> {
        if !self.state.read().await.is_authenticated() {
            return Ok(None);
        }
        self.provider.current_token(force_refresh).await.inspect_err(|e| {
            warn!(error = %e, "Failed to obtain bearer token");
        })
    }

    async fn update_user(&self, patch: ProfilePatch) -> bool {
        let current = self.state.read().await.clone();
        match current {
            SessionState::Authenticated(mut session) => {
                session.profile.apply(patch);
                self.publish(SessionState::Authenticated(session)).await;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
