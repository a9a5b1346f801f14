//! # Profile Loading
//!
//! Turns a provider principal into a validated [`UserProfile`].
//!
//! ## Validation Order
//! ```text
//! principal
//!    │
//!    ▼
//! get_profile(uid) ── absent ─────────────────► ProfileNotFound
//!    │            ├── transport failure ───────► ProfileUnavailable
//!    │            └── undecodable record ──────► ProfileMalformed
//!    ▼
//! required fields ── any missing ──────────────► MissingFields([...])
//!    ▼
//! role ∈ {admin, staff} ── otherwise ──────────► InvalidRole
//!    ▼
//! isActive ── false ───────────────────────────► AccountInactive
//!    ▼
//! businessId? ── referenced but absent ────────► BusinessNotFound
//!    ▼
//! UserProfile (branch defaults to "<business> - Main Branch")
//! ```

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use tally_core::{Branch, Business, Role, UserProfile};

use crate::error::{AuthError, ProfileStoreError};
use crate::provider::Principal;

/// Raw profile record as the store holds it. Nothing is trusted yet.
///
/// `role` and `isActive` decode from any JSON value so a wrongly typed field
/// is rejected by validation instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "any_as_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "strict_flag")]
    pub is_active: Option<bool>,
    pub business_id: Option<String>,
    pub branch: Option<Branch>,
    #[serde(alias = "avatar", alias = "photo")]
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read-only store of profile and business records keyed by principal id.
///
/// Absent records are `Ok(None)`. Errors mean the store could not answer.
pub trait ProfileStore: Send + Sync + 'static {
    fn get_profile(
        &self,
        principal: &Principal,
    ) -> impl Future<Output = Result<Option<ProfileRecord>, ProfileStoreError>> + Send;

    fn get_business(
        &self,
        principal: &Principal,
        business_id: &str,
    ) -> impl Future<Output = Result<Option<Business>, ProfileStoreError>> + Send;
}

/// Strings pass through; numbers, objects and the like keep their JSON text.
fn any_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Only a JSON `true` counts as true.
fn strict_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(flag),
        Some(_) => Some(false),
    })
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn store_failure(err: ProfileStoreError) -> AuthError {
    match &err {
        ProfileStoreError::Transport(_) => {
            error!(error = %err, "Profile store unreachable");
            AuthError::ProfileUnavailable
        }
        ProfileStoreError::Decode(_) => {
            error!(error = %err, "Profile record is malformed");
            AuthError::ProfileMalformed
        }
    }
}

/// Fetches and validates the profile for `principal`.
pub async fn load_profile<S: ProfileStore>(
    store: &S,
    principal: &Principal,
) -> Result<UserProfile, AuthError> {
    let record = store
        .get_profile(principal)
        .await
        .map_err(store_failure)?
        .ok_or(AuthError::ProfileNotFound)?;

    let mut missing = Vec::new();
    if blank(&record.first_name) {
        missing.push("firstName".to_string());
    }
    if blank(&record.last_name) {
        missing.push("lastName".to_string());
    }
    if blank(&record.email) {
        missing.push("email".to_string());
    }
    if blank(&record.role) {
        missing.push("role".to_string());
    }
    if record.is_active.is_none() {
        missing.push("isActive".to_string());
    }
    if !missing.is_empty() {
        debug!(uid = %principal.uid, ?missing, "Profile incomplete");
        return Err(AuthError::MissingFields(missing));
    }

    let role: Role = record
        .role
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AuthError::InvalidRole)?;

    if record.is_active != Some(true) {
        return Err(AuthError::AccountInactive);
    }

    let business = match record.business_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(id) => Some(
            store
                .get_business(principal, id)
                .await
                .map_err(store_failure)?
                .ok_or(AuthError::BusinessNotFound)?,
        ),
        None => None,
    };

    let branch = record
        .branch
        .clone()
        .or_else(|| business.as_ref().map(Branch::main_for));

    let first_name = record.first_name.unwrap_or_default().trim().to_string();
    let last_name = record.last_name.unwrap_or_default().trim().to_string();

    Ok(UserProfile {
        id: principal.uid.clone(),
        email: record.email.unwrap_or_default(),
        full_name: UserProfile::compose_full_name(&first_name, &last_name),
        first_name,
        last_name,
        role,
        business_id: business.as_ref().map(|b| b.id.clone()),
        business,
        branch,
        is_active: true,
        phone: record.phone,
        gender: record.gender,
        profile_image: record.profile_image.or_else(|| principal.photo_url.clone()),
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
