//! # tally-session: Session Management for the Tally Dashboard
//!
//! Authenticates users against an external identity provider, validates the
//! business profile that belongs to them, and publishes one consistent
//! session state that every screen reads.
//!
//! ## Data Flow
//! ```text
//! ┌──────────────────┐   auth-state (watch)   ┌──────────────────────────┐
//! │ IdentityProvider │ ─────────────────────▶ │                          │
//! │  REST | memory   │ ◀── sign_in/out ────── │     SessionManager       │
//! └──────────────────┘                        │     (one tokio task)     │
//!                                             │                          │
//! ┌──────────────────┐   get_profile(uid)     │  Unknown                 │
//! │  ProfileStore    │ ◀───────────────────── │  Authenticating          │
//! │  REST | memory   │ ─── record ──────────▶ │  Authenticated(Session)  │
//! └──────────────────┘                        │  Unauthenticated         │
//!                                             └────────────┬─────────────┘
//!                                                          │ watch<SessionState>
//!                                                          ▼
//!                                                   SessionHandle (screens)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally_session::memory::{MemoryIdentityProvider, MemoryProfileStore};
//! use tally_session::SessionManager;
//!
//! # async fn demo() {
//! let provider = Arc::new(MemoryIdentityProvider::new());
//! let profiles = Arc::new(MemoryProfileStore::new());
//! let session = SessionManager::new(provider, profiles).start();
//!
//! if !session.login("owner@shop.rw", "secret").await {
//!     println!("{:?}", session.error_message().await);
//! }
//! # }
//! ```

pub mod error;
pub mod manager;
pub mod memory;
pub mod profile;
pub mod provider;
pub mod rest;

pub use error::{AuthError, ProfileStoreError, ProviderError, ProviderErrorCode, SessionError, SessionResult};
pub use manager::{Session, SessionHandle, SessionManager, SessionSnapshot, SessionState};
pub use profile::{load_profile, ProfileRecord, ProfileStore};
pub use provider::{IdentityProvider, Principal};
pub use rest::{ConsentFlow, FederatedCredential, NoConsent, RestIdentityConfig, RestIdentityProvider, RestProfileStore};
