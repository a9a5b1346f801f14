//! # tally-core: Pure Business Logic for the Tally Dashboard
//!
//! This crate holds every rule of the retail dashboard that can be expressed
//! without touching the network: money, the credit ledger, sell flows,
//! role capabilities, navigation search, form validation and CSV rendering.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web shell (TypeScript)                       │   │
//! │  │    Login ──► Store ──► Sold ──► Restored ──► Admin screens      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-dashboard (screens)                        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼──────────────────┐   │
//! │  │  tally-session              │  │  tally-api (REST client)      │   │
//! │  └──────────────┬──────────────┘  └────────────┬──────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────────▼───────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ ledger  │ │  authz  │ │ export  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────────┐           │   │
//! │  │   │ selling │ │ search  │ │ listing  │ │validation │           │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └───────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (products, branches, employees, profiles)
//! - [`money`] - Whole-unit integer money with RWF display
//! - [`ledger`] - Credit sales, payments, profit/loss
//! - [`selling`] - Sell-from-store and sell-from-restored validation
//! - [`authz`] - Role capabilities and screen access
//! - [`search`] - Navigation search index
//! - [`listing`] - Sold-products filtering, sorting and totals
//! - [`reports`] - Scheduled report settings
//! - [`validation`] - Form and input validation
//! - [`export`] - CSV rendering of visible tables
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::ledger::CreditSale;
//! use tally_core::{Money, PaymentStatus};
//!
//! let sale = CreditSale::new(2, Money::from_units(5_000), Money::zero()).unwrap();
//! let sale = sale.record_payment(Money::from_units(4_000)).unwrap();
//!
//! assert_eq!(sale.balance_due(), Money::from_units(6_000));
//! assert_eq!(sale.payment_status(), PaymentStatus::Partial);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod error;
pub mod export;
pub mod ledger;
pub mod listing;
pub mod money;
pub mod reports;
pub mod search;
pub mod selling;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use authz::{Capabilities, Screen};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency label used when rendering amounts.
pub const DEFAULT_CURRENCY: &str = "RWF";

/// Placeholder rendered wherever an amount is not available.
pub const MISSING_AMOUNT: &str = "–";

/// Maximum length of a navigation search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
