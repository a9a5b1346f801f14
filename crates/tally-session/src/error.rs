//! # Session Error Types
//!
//! Three layers of errors meet in this crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  ProviderError  │  │ProfileStoreError│  │      AuthError          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  raw code from  │  │  Transport      │  │  user-facing message    │ │
//! │  │  the identity   │  │  Decode         │  │  shown on the login     │ │
//! │  │  service        │  │                 │  │  screen                 │ │
//! │  └────────┬────────┘  └────────┬────────┘  └────────────▲────────────┘ │
//! │           │                    │                        │              │
//! │           └────────────────────┴──── mapped by ─────────┘              │
//! │                                    SessionManager                       │
//! │                                                                         │
//! │  SessionError wraps everything for callers that talk to the task.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Provider Errors
// =============================================================================

/// Failure codes an identity provider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// No account for this identifier.
    NotFound,
    /// Secret did not match.
    WrongSecret,
    /// Identifier is not a well-formed email.
    MalformedEmail,
    /// Too many attempts, try later.
    RateLimited,
    /// User closed the consent window.
    PopupClosed,
    /// Consent window could not be opened.
    PopupBlocked,
    /// Token was revoked or expired for good.
    SessionExpired,
    /// Transport failure.
    Network,
    /// Anything else.
    Other,
}

/// Error reported by an [`IdentityProvider`](crate::provider::IdentityProvider).
#[derive(Debug, Clone, Error)]
#[error("identity provider error ({code:?}): {detail}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub detail: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, detail: impl Into<String>) -> Self {
        ProviderError {
            code,
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Network, detail)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::new(ProviderErrorCode::Other, err.to_string())
        } else {
            ProviderError::network(err.to_string())
        }
    }
}

// =============================================================================
// Profile Store Errors
// =============================================================================

/// Error reported by a [`ProfileStore`](crate::profile::ProfileStore).
///
/// An absent record is not an error; stores return `Ok(None)` for it.
#[derive(Debug, Clone, Error)]
pub enum ProfileStoreError {
    #[error("Profile store unreachable: {0}")]
    Transport(String),

    #[error("Profile record could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProfileStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProfileStoreError::Decode(err.to_string())
        } else {
            ProfileStoreError::Transport(err.to_string())
        }
    }
}

// =============================================================================
// User-Facing Authentication Errors
// =============================================================================

/// Authentication failure as the login screen shows it.
///
/// `Display` is the exact message the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Identifier was not an email address. Rejected before any provider call.
    #[error("Use your email address.")]
    UseEmail,

    #[error("No account found.")]
    AccountNotFound,

    #[error("Incorrect password.")]
    WrongPassword,

    #[error("Invalid email.")]
    InvalidEmail,

    #[error("Too many attempts.")]
    TooManyAttempts,

    #[error("Login failed.")]
    LoginFailed,

    // =========================================================================
    // Federated Sign-In Errors
    // =========================================================================
    #[error("Login cancelled.")]
    LoginCancelled,

    #[error("Popup blocked.")]
    PopupBlocked,

    #[error("Federated login failed.")]
    FederatedLoginFailed,

    // =========================================================================
    // Password Reset Errors
    // =========================================================================
    #[error("Failed to send reset email.")]
    ResetFailed,

    // =========================================================================
    // Profile Errors
    // =========================================================================
    #[error("User record not found. Contact support.")]
    ProfileNotFound,

    #[error("Missing: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid role.")]
    InvalidRole,

    #[error("Account not activated.")]
    AccountInactive,

    #[error("Business not found.")]
    BusinessNotFound,

    /// The stored record exists but could not be read.
    #[error("Invalid user record. Contact support.")]
    ProfileMalformed,

    /// Profile store could not be reached. The user may simply try again.
    #[error("Failed to load user data.")]
    ProfileUnavailable,

    // =========================================================================
    // Internal
    // =========================================================================
    #[error("Session service is not running.")]
    SessionClosed,
}

impl AuthError {
    /// Maps a provider failure during email/password sign-in.
    pub fn from_sign_in(err: &ProviderError) -> Self {
        match err.code {
            ProviderErrorCode::NotFound => AuthError::AccountNotFound,
            ProviderErrorCode::WrongSecret => AuthError::WrongPassword,
            ProviderErrorCode::MalformedEmail => AuthError::InvalidEmail,
            ProviderErrorCode::RateLimited => AuthError::TooManyAttempts,
            _ => AuthError::LoginFailed,
        }
    }

    /// Maps a provider failure during federated sign-in.
    pub fn from_federated(err: &ProviderError) -> Self {
        match err.code {
            ProviderErrorCode::PopupClosed => AuthError::LoginCancelled,
            ProviderErrorCode::PopupBlocked => AuthError::PopupBlocked,
            _ => AuthError::FederatedLoginFailed,
        }
    }

    /// Maps a provider failure while sending a reset email.
    pub fn from_reset(err: &ProviderError) -> Self {
        match err.code {
            ProviderErrorCode::NotFound => AuthError::AccountNotFound,
            ProviderErrorCode::MalformedEmail => AuthError::InvalidEmail,
            _ => AuthError::ResetFailed,
        }
    }

    /// Whether the provider session must be revoked after this failure.
    ///
    /// A principal whose profile is unusable never stays signed in with the
    /// provider. Transport failures leave the provider session alone.
    pub fn forces_sign_out(&self) -> bool {
        matches!(
            self,
            AuthError::ProfileNotFound
                | AuthError::ProfileMalformed
                | AuthError::MissingFields(_)
                | AuthError::InvalidRole
                | AuthError::AccountInactive
                | AuthError::BusinessNotFound
        )
    }
}

// =============================================================================
// Session Errors
// =============================================================================

/// Error type for callers of the session handle and its collaborators.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Invalid provider or store configuration.
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    ProfileStore(#[from] ProfileStoreError),

    /// Command channel to the session task is closed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl SessionError {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Provider(e) => e.code == ProviderErrorCode::Network,
            SessionError::ProfileStore(ProfileStoreError::Transport(_)) => true,
            SessionError::Auth(AuthError::ProfileUnavailable) => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, SessionError::InvalidConfig(_))
    }
}

impl From<url::ParseError> for SessionError {
    fn from(err: url::ParseError) -> Self {
        SessionError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_mapping() {
        let cases = [
            (ProviderErrorCode::NotFound, "No account found."),
            (ProviderErrorCode::WrongSecret, "Incorrect password."),
            (ProviderErrorCode::MalformedEmail, "Invalid email."),
            (ProviderErrorCode::RateLimited, "Too many attempts."),
            (ProviderErrorCode::Network, "Login failed."),
            (ProviderErrorCode::Other, "Login failed."),
        ];
        for (code, message) in cases {
            let err = ProviderError::new(code, "x");
            assert_eq!(AuthError::from_sign_in(&err).to_string(), message);
        }
    }

    #[test]
    fn test_federated_mapping() {
        let closed = ProviderError::new(ProviderErrorCode::PopupClosed, "closed");
        let blocked = ProviderError::new(ProviderErrorCode::PopupBlocked, "blocked");
        let other = ProviderError::new(ProviderErrorCode::Other, "boom");
        assert_eq!(AuthError::from_federated(&closed).to_string(), "Login cancelled.");
        assert_eq!(AuthError::from_federated(&blocked).to_string(), "Popup blocked.");
        assert_eq!(AuthError::from_federated(&other).to_string(), "Federated login failed.");
    }

    #[test]
    fn test_missing_fields_message() {
        let err = AuthError::MissingFields(vec!["firstName".into(), "role".into()]);
        assert_eq!(err.to_string(), "Missing: firstName, role");
        assert!(err.forces_sign_out());
    }

    #[test]
    fn test_transport_failure_keeps_provider_session() {
        assert!(!AuthError::ProfileUnavailable.forces_sign_out());
        assert!(!AuthError::WrongPassword.forces_sign_out());
        assert!(AuthError::AccountInactive.forces_sign_out());
        assert!(AuthError::ProfileMalformed.forces_sign_out());
    }

    #[test]
    fn test_retryable() {
        assert!(SessionError::Provider(ProviderError::network("reset")).is_retryable());
        assert!(SessionError::Auth(AuthError::ProfileUnavailable).is_retryable());
        assert!(!SessionError::Auth(AuthError::InvalidRole).is_retryable());
        assert!(SessionError::InvalidConfig("bad".into()).is_config_error());
    }
}
