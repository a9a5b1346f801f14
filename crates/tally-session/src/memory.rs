//! # In-Memory Provider and Store
//!
//! Process-local implementations of [`IdentityProvider`] and [`ProfileStore`]
//! for offline demos and tests. They behave like the real services from the
//! session manager's point of view, including externally revoked sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{watch, Mutex, RwLock};
use tracing::debug;

use tally_core::validation::validate_email;
use tally_core::Business;

use crate::error::{ProfileStoreError, ProviderError, ProviderErrorCode};
use crate::profile::{ProfileRecord, ProfileStore};
use crate::provider::{IdentityProvider, Principal};

// =============================================================================
// Identity Provider
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    secret: String,
    principal: Principal,
}

/// Identity provider backed by a map of accounts.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    federated: Mutex<Option<Result<Principal, ProviderErrorCode>>>,
    injected: Mutex<Option<ProviderErrorCode>>,
    reset_requests: Mutex<Vec<String>>,
    state_tx: watch::Sender<Option<Principal>>,
    sign_outs: AtomicUsize,
    token_serial: AtomicUsize,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(None);
        MemoryIdentityProvider {
            accounts: RwLock::new(HashMap::new()),
            federated: Mutex::new(None),
            injected: Mutex::new(None),
            reset_requests: Mutex::new(Vec::new()),
            state_tx,
            sign_outs: AtomicUsize::new(0),
            token_serial: AtomicUsize::new(0),
        }
    }

    /// Registers an account and returns its principal.
    pub async fn add_account(&self, email: &str, secret: &str, uid: &str) -> Principal {
        let principal = Principal {
            uid: uid.to_string(),
            email: Some(email.to_string()),
            display_name: None,
            photo_url: None,
            id_token: self.next_token(uid),
        };
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account {
                secret: secret.to_string(),
                principal: principal.clone(),
            },
        );
        principal
    }

    /// Outcome of the next federated sign-in.
    pub async fn set_federated_outcome(&self, outcome: Result<Principal, ProviderErrorCode>) {
        *self.federated.lock().await = Some(outcome);
    }

    /// Makes the next provider call fail with `code`.
    pub async fn fail_next(&self, code: ProviderErrorCode) {
        *self.injected.lock().await = Some(code);
    }

    /// Simulates a session already restored when the dashboard starts.
    pub fn restore(&self, principal: Principal) {
        self.state_tx.send_replace(Some(principal));
    }

    /// Simulates the session being revoked outside the dashboard.
    pub fn revoke_externally(&self) {
        debug!("Revoking provider session externally");
        self.state_tx.send_replace(None);
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub async fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.lock().await.clone()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.state_tx.borrow().clone()
    }

    fn next_token(&self, uid: &str) -> String {
        let serial = self.token_serial.fetch_add(1, Ordering::SeqCst);
        format!("{uid}.token.{serial}")
    }

    async fn take_injected(&self) -> Result<(), ProviderError> {
        match self.injected.lock().await.take() {
            Some(code) => Err(ProviderError::new(code, "injected failure")),
            None => Ok(()),
        }
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Principal, ProviderError> {
        self.take_injected().await?;
        if validate_email(email).is_err() {
            return Err(ProviderError::new(ProviderErrorCode::MalformedEmail, email));
        }

        let account = self
            .accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .cloned()
            .ok_or_else(|| ProviderError::new(ProviderErrorCode::NotFound, email))?;
        if account.secret != secret {
            return Err(ProviderError::new(ProviderErrorCode::WrongSecret, email));
        }

        let mut principal = account.principal;
        principal.id_token = self.next_token(&principal.uid);
        self.state_tx.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_in_federated(&self) -> Result<Principal, ProviderError> {
        self.take_injected().await?;
        match self.federated.lock().await.take() {
            Some(Ok(principal)) => {
                self.state_tx.send_replace(Some(principal.clone()));
                Ok(principal)
            }
            Some(Err(code)) => Err(ProviderError::new(code, "federated sign-in failed")),
            None => Err(ProviderError::new(ProviderErrorCode::PopupClosed, "no consent given")),
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.state_tx.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.take_injected().await?;
        if !self.accounts.read().await.contains_key(&email.to_lowercase()) {
            return Err(ProviderError::new(ProviderErrorCode::NotFound, email));
        }
        self.reset_requests.lock().await.push(email.to_string());
        Ok(())
    }

    async fn current_token(&self, force_refresh: bool) -> Result<Option<String>, ProviderError> {
        self.take_injected().await?;
        let uid = match self.state_tx.borrow().as_ref() {
            Some(principal) => principal.uid.clone(),
            None => return Ok(None),
        };
        if force_refresh {
            Ok(Some(self.next_token(&uid)))
        } else {
            Ok(self.state_tx.borrow().as_ref().map(|p| p.id_token.clone()))
        }
    }

    fn auth_state(&self) -> watch::Receiver<Option<Principal>> {
        self.state_tx.subscribe()
    }
}

// =============================================================================
// Profile Store
// =============================================================================

/// Profile store backed by two maps.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, ProfileRecord>>,
    businesses: RwLock<HashMap<String, Business>>,
    unreachable: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_profile(&self, uid: &str, record: ProfileRecord) {
        self.profiles.write().await.insert(uid.to_string(), record);
    }

    pub async fn put_business(&self, business: Business) {
        self.businesses.write().await.insert(business.id.clone(), business);
    }

    /// While set, every lookup fails with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), ProfileStoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(ProfileStoreError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, principal: &Principal) -> Result<Option<ProfileRecord>, ProfileStoreError> {
        self.check_reachable()?;
        Ok(self.profiles.read().await.get(&principal.uid).cloned())
    }

    async fn get_business(
        &self,
        _principal: &Principal,
        business_id: &str,
    ) -> Result<Option<Business>, ProfileStoreError> {
        self.check_reachable()?;
        Ok(self.businesses.read().await.get(business_id).cloned())
    }
}
