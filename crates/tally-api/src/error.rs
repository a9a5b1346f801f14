//! # API Error Types
//!
//! Failures of a backend call, split the way the screens react to them:
//!
//! ```text
//! ┌─────────────────┐  ┌──────────────────────────┐  ┌─────────────────┐
//! │    Transport    │  │        Backend           │  │     Decode      │
//! │                 │  │                          │  │                 │
//! │  Http           │  │  Backend{status,message} │  │  Decode         │
//! │  InvalidUrl     │  │  success = false or 4xx  │  │  missing data   │
//! │  Token          │  │                          │  │                 │
//! └─────────────────┘  └──────────────────────────┘  └─────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when the backend gave no usable one.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request never produced a response.
    #[error("Network error: {0}")]
    Http(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Bearer token could not be obtained; nothing was sent.
    #[error("Session token unavailable: {0}")]
    Token(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Backend answered with a failure. `message` is safe to show.
    #[error("{message}")]
    Backend { status: u16, message: String },

    // =========================================================================
    // Decode Errors
    // =========================================================================
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn backend(status: u16, message: Option<String>) -> Self {
        ApiError::Backend {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        }
    }

    /// HTTP status of a backend failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns true if the call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(_) | ApiError::Token(_) => true,
            ApiError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let (Some(status), false) = (err.status(), err.is_connect()) {
            ApiError::backend(status.as_u16(), None)
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_fallback() {
        assert_eq!(
            ApiError::backend(500, None).to_string(),
            "An unexpected error occurred"
        );
        assert_eq!(
            ApiError::backend(400, Some("  ".into())).to_string(),
            "An unexpected error occurred"
        );
        assert_eq!(
            ApiError::backend(400, Some("Branch already exists".into())).to_string(),
            "Branch already exists"
        );
    }

    #[test]
    fn test_categories() {
        assert!(ApiError::backend(404, None).is_not_found());
        assert!(ApiError::backend(401, None).is_unauthorized());
        assert!(ApiError::backend(503, None).is_retryable());
        assert!(!ApiError::backend(400, None).is_retryable());
        assert!(ApiError::Http("reset".into()).is_retryable());
    }
}
