//! # Screen Error Type
//!
//! Unified error type for dashboard commands, plus the bootstrap error.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dashboard                          │
//! │                                                                         │
//! │  Web shell                   Rust commands                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  invoke('record_payment')                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  ->  Result<T, ScreenError>                    │  │
//! │  │         │                                                        │  │
//! │  │  Guard?       ── CoreError::AccessDenied ──► ACCESS_DENIED      │  │
//! │  │  Validation?  ── CoreError / ValidationError ► VALIDATION_ERROR │  │
//! │  │  Identity?    ── AuthError ────────────────► IDENTITY_ERROR     │  │
//! │  │  Backend?     ── ApiError ─────────────────► BACKEND_ERROR      │  │
//! │  │                                              | NOT_FOUND        │  │
//! │  │  Duplicate payment? ───────────────────────► PAYMENT_IN_FLIGHT  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    if (e.code === 'ACCESS_DENIED') renderBlockingView(e.message)        │
//! │    else toast(e.message)                                                │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tally_api::{ApiError, GENERIC_ERROR_MESSAGE};
use tally_core::{CoreError, ValidationError};
use tally_session::{AuthError, SessionError};

/// Error returned from dashboard commands.
///
/// ```json
/// { "code": "ACCESS_DENIED", "message": "You are not authorized to access this page. Only admins can manage branches." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected before any request was sent
    ValidationError,

    /// Sign-in, sign-out or reset failed
    IdentityError,

    /// The backend refused or could not be reached
    BackendError,

    /// Role does not allow the screen or action
    AccessDenied,

    /// Resource not found (404)
    NotFound,

    /// A payment for the same sale is still outstanding
    PaymentInFlight,

    /// Anything the user cannot act on
    Internal,
}

impl ScreenError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ScreenError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ScreenError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ScreenError::new(ErrorCode::Internal, message)
    }

    pub fn payment_in_flight() -> Self {
        ScreenError::new(
            ErrorCode::PaymentInFlight,
            "A payment for this sale is already being processed.",
        )
    }

    /// The shell renders these as a blocking view rather than a toast.
    pub fn is_access_denied(&self) -> bool {
        self.code == ErrorCode::AccessDenied
    }
}

impl From<CoreError> for ScreenError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AccessDenied { .. } => ScreenError::new(ErrorCode::AccessDenied, err.to_string()),
            CoreError::Export(e) => {
                error!("CSV export failed: {}", e);
                ScreenError::internal("Export failed.")
            }
            other => ScreenError::validation(other.to_string()),
        }
    }
}

impl From<ValidationError> for ScreenError {
    fn from(err: ValidationError) -> Self {
        ScreenError::validation(err.to_string())
    }
}

impl From<AuthError> for ScreenError {
    fn from(err: AuthError) -> Self {
        ScreenError::new(ErrorCode::IdentityError, err.to_string())
    }
}

impl From<SessionError> for ScreenError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Auth(auth) => auth.into(),
            SessionError::ChannelError(e) => {
                error!("Session channel failed: {}", e);
                ScreenError::from(AuthError::SessionClosed)
            }
            other => {
                error!("Session error: {}", other);
                ScreenError::new(ErrorCode::IdentityError, GENERIC_ERROR_MESSAGE)
            }
        }
    }
}

/// Backend messages are written for users and pass through; transport and
/// decode failures are logged and replaced with the generic message.
impl From<ApiError> for ScreenError {
    fn from(err: ApiError) -> Self {
        if err.is_not_found() {
            return ScreenError::new(ErrorCode::NotFound, err.to_string());
        }
        match err {
            ApiError::Backend { status: 403, message } => ScreenError::new(ErrorCode::AccessDenied, message),
            ApiError::Backend { message, .. } => ScreenError::new(ErrorCode::BackendError, message),
            other => {
                error!("Backend call failed: {}", other);
                ScreenError::new(ErrorCode::BackendError, GENERIC_ERROR_MESSAGE)
            }
        }
    }
}

impl std::fmt::Display for ScreenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ScreenError {}

// =============================================================================
// Bootstrap Error
// =============================================================================

/// Errors raised while loading config and wiring the app together.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Session setup failed: {0}")]
    Session(#[from] SessionError),

    #[error("API client setup failed: {0}")]
    Api(#[from] ApiError),
}

impl DashboardError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DashboardError::InvalidConfig(_) | DashboardError::ConfigParse(_) | DashboardError::ConfigSerialize(_)
        )
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::authz::{Capabilities, Screen};
    use tally_core::Money;

    #[test]
    fn test_access_denied_keeps_its_code() {
        let err = Capabilities::from_role(None)
            .require_access(Screen::ManageBranch)
            .unwrap_err();
        let screen: ScreenError = err.into();
        assert!(screen.is_access_denied());
        assert!(screen.message.contains("Only admins can manage branches."));
    }

    #[test]
    fn test_ledger_errors_are_validation() {
        let err: ScreenError = CoreError::PaymentOutOfRange {
            amount: Money::from_units(5),
            min: Money::from_units(1),
            max: Money::from_units(2),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_backend_messages() {
        let err: ScreenError = ApiError::backend(404, Some("Branch not found".into())).into();
        assert_eq!(err, ScreenError::new(ErrorCode::NotFound, "Branch not found"));

        let err: ScreenError = ApiError::backend(400, Some("Branch already exists".into())).into();
        assert_eq!(err.code, ErrorCode::BackendError);
        assert_eq!(err.message, "Branch already exists");

        let err: ScreenError = ApiError::Http("connection refused".into()).into();
        assert_eq!(err.message, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_auth_errors_keep_user_message() {
        let err: ScreenError = SessionError::Auth(AuthError::WrongPassword).into();
        assert_eq!(err.code, ErrorCode::IdentityError);
        assert_eq!(err.message, "Incorrect password.");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ScreenError::payment_in_flight()).unwrap();
        assert_eq!(json["code"], "PAYMENT_IN_FLIGHT");
    }
}
