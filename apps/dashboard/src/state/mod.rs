//! # Dashboard State
//!
//! Everything a command needs, wired once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dashboard                                       │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────────┐ ┌──────────────────┐    │
//! │  │ SessionHandle    │ │ ApiClient<Session>   │ │ PaymentGuard     │    │
//! │  │ • state / caps   │ │ • bearer per request │ │ • sale ids in    │    │
//! │  │ • login/logout   │ │ • typed endpoints    │ │   flight         │    │
//! │  └──────────────────┘ └──────────────────────┘ └──────────────────┘    │
//! │  ┌──────────────────┐ ┌──────────────────────┐                         │
//! │  │ DashboardConfig  │ │ SearchIndex          │                         │
//! │  └──────────────────┘ └──────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod payments;

pub use payments::{PaymentGuard, PaymentTicket};

use std::sync::Arc;

use tracing::info;

use tally_api::ApiClient;
use tally_core::authz::{Capabilities, Screen};
use tally_core::search::SearchIndex;
use tally_session::{
    RestIdentityConfig, RestIdentityProvider, RestProfileStore, SessionHandle, SessionManager,
};

use crate::config::DashboardConfig;
use crate::error::{DashboardResult, ScreenError};

/// Application state shared by every command.
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    session: SessionHandle,
    api: ApiClient<SessionHandle>,
    payments: PaymentGuard,
    search: Arc<SearchIndex>,
}

impl Dashboard {
    /// Wires a dashboard around an already running session.
    pub fn new(config: DashboardConfig, session: SessionHandle) -> DashboardResult<Self> {
        config.validate()?;
        let api = ApiClient::new(config.api_url()?, config.timeout(), session.clone())?;
        Ok(Dashboard {
            config: Arc::new(config),
            session,
            api,
            payments: PaymentGuard::new(),
            search: Arc::new(SearchIndex::navigation()),
        })
    }

    /// Starts the REST-backed session manager and wires the dashboard.
    ///
    /// ## Startup Sequence
    /// 1. Validate config
    /// 2. Build the identity provider and profile store
    /// 3. Spawn the session task (sole consumer of identity events)
    /// 4. Build the backend client on top of the session handle
    pub async fn bootstrap(config: DashboardConfig) -> DashboardResult<Self> {
        config.validate()?;

        let provider = RestIdentityProvider::new(RestIdentityConfig {
            identity_url: config.identity_url()?,
            token_url: config.token_url()?,
            api_key: config.identity.api_key.clone(),
            timeout: config.timeout(),
        })?;
        let profiles = RestProfileStore::new(config.profile_url()?, config.timeout())?;

        let session = SessionManager::new(Arc::new(provider), Arc::new(profiles)).start();
        info!(api = %config.api.base_url, "Session manager started");

        Self::new(config, session)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn api(&self) -> &ApiClient<SessionHandle> {
        &self.api
    }

    pub fn payments(&self) -> &PaymentGuard {
        &self.payments
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search
    }

    /// Guards entry to `screen` and returns the caller's capabilities.
    pub async fn enter(&self, screen: Screen) -> Result<Capabilities, ScreenError> {
        let caps = self.session.capabilities().await;
        caps.require_access(screen)?;
        Ok(caps)
    }

    /// Stops the session task. Commands fail with an identity error after.
    pub async fn shutdown(&self) {
        if self.session.shutdown().await.is_ok() {
            info!("Dashboard shut down");
        }
    }
}
