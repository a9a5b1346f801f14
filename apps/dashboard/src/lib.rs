//! # Tally Dashboard Library
//!
//! Command layer of the Tally retail dashboard. The web shell calls one
//! async command per screen action; this crate guards it, validates it and
//! forwards it to the backend.
//!
//! ## Module Organization
//! ```text
//! tally_dashboard/
//! ├── lib.rs          ◄─── You are here (logging, re-exports)
//! ├── config.rs       ◄─── dashboard.toml + TALLY_* overrides
//! ├── error.rs        ◄─── ScreenError for commands, DashboardError for boot
//! ├── state/
//! │   ├── mod.rs      ◄─── Dashboard (session, api client, guards)
//! │   └── payments.rs ◄─── Single-flight guard for credit payments
//! └── commands/       ◄─── One module per screen
//! ```
//!
//! ## Startup
//! ```text
//! run()
//!   └─► init_tracing() ──► DashboardConfig::load() ──► Dashboard::bootstrap()
//!                                                           │
//!                               SessionManager::start() ◄───┤
//!                               ApiClient::new(session) ◄───┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult, ErrorCode, ScreenError};
pub use state::{Dashboard, PaymentGuard};

use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug,reqwest=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_session=trace` - Trace the session task only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Starts the dashboard, reports the resolved session, then shuts down.
///
/// ## Startup Sequence
/// 1. Initialize tracing (logging)
/// 2. Load config from `TALLY_CONFIG` or the platform config directory
/// 3. Bootstrap the session manager and backend client
/// 4. Wait for the first session resolution and print the snapshot
pub async fn run() -> DashboardResult<()> {
    init_tracing();
    info!("Starting Tally dashboard");

    let config_path = std::env::var_os("TALLY_CONFIG").map(PathBuf::from);
    let config = DashboardConfig::load_or_default(config_path);
    let app = Dashboard::bootstrap(config).await?;

    app.session().wait_until_resolved().await;
    let snapshot = app.session().snapshot().await;
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!("Failed to render session snapshot: {}", e),
    }

    app.shutdown().await;
    Ok(())
}
