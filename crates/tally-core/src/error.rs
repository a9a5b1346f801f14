//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Ledger, stock and access failures              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-session errors                                                  │
//! │  └── SessionError / AuthError - identity and profile failures          │
//! │                                                                         │
//! │  tally-api errors                                                      │
//! │  └── ApiError         - transport and backend envelope failures        │
//! │                                                                         │
//! │  tally-dashboard                                                       │
//! │  └── ScreenError      - What the web shell sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ScreenError → Web shell           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation messages are written so they can be shown to the user as-is:
//! field labels are human labels ("Selling price"), not struct field names.

use thiserror::Error;

use crate::authz::Screen;
use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A payment is outside the range the sale accepts.
    ///
    /// ## When This Occurs
    /// ```text
    /// Sale total RWF 30,000, paid RWF 10,000, balance RWF 20,000
    ///      │
    ///      ▼
    /// record_payment(RWF 25,000)
    ///      │
    ///      ▼
    /// PaymentOutOfRange { amount: 25,000, min: 1, max: 20,000 }
    ///      │
    ///      ▼
    /// UI shows: "Max: RWF 20,000"
    /// ```
    #[error("Payment of {amount} is out of range. Max: {max}")]
    PaymentOutOfRange { amount: Money, min: Money, max: Money },

    /// The sale has no outstanding balance.
    #[error("Sale is already fully paid")]
    SaleSettled,

    /// The amount paid at sale time exceeds what is owed.
    #[error("Amount paid {paid} cannot exceed the total of {total}.")]
    OverPayment { paid: Money, total: Money },

    /// Trying to sell more than the available stock.
    #[error("Quantity cannot exceed available stock of {available}.")]
    InsufficientStock { available: i64, requested: i64 },

    /// The caller's role does not allow the screen or action.
    #[error("You are not authorized to access this page. {reason}")]
    AccessDenied { screen: Screen, reason: String },

    /// Rendering a CSV table failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true if the error should block the whole screen rather than
    /// surface as a toast.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, CoreError::AccessDenied { .. })
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Export(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These never reach the network: every submission is validated locally
/// before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required.")]
    Required { field: String },

    /// Several required form fields are empty.
    #[error("Please fill in all required fields: {}", missing.join(", "))]
    Incomplete { missing: Vec<String> },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be a number between {min} and {max}.")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// A computed amount does not fit in the ledger.
    #[error("{field} is too large.")]
    TooLarge { field: String },

    /// Value must be greater than zero.
    #[error("{field} must be greater than 0.")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative.")]
    Negative { field: String },

    /// A date that must be today or later lies in the past.
    #[error("{field} cannot be in the past.")]
    InPast { field: String },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. recipient email added twice).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
