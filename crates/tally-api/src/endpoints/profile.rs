//! Signed-in user's own profile and report settings.
//!
//! These endpoints answer with bare JSON rather than the envelope, and the
//! profile photo travels as `imagephoto`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use ts_rs::TS;

use tally_core::reports::ReportSettings;
use tally_core::{Branch, BranchRef, ProfileForm, Role};

use crate::client::{ApiClient, TokenSource};
use crate::error::{ApiError, ApiResult};

/// Branch as the profile endpoint reports it: a plain name or an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ProfileBranch {
    Name(String),
    Ref(BranchRef),
}

impl ProfileBranch {
    pub fn name(&self) -> Option<&str> {
        match self {
            ProfileBranch::Name(name) => Some(name),
            ProfileBranch::Ref(branch) => branch.branch_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub branch: Option<ProfileBranch>,
    pub role: Role,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, rename = "imagephoto", alias = "profileImage")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub cell: String,
    #[serde(default)]
    pub village: String,
}

impl ProfileDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Body of `PUT /profile`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "imagephoto", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub district: String,
    pub sector: String,
    pub cell: String,
    pub village: String,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        ProfileUpdate {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            profile_image: form.profile_image,
            district: form.district,
            sector: form.sector,
            cell: form.cell,
            village: form.village,
        }
    }
}

/// Replaces branch objects in `branches` with their names.
fn normalize_report_branches(mut body: Value) -> Value {
    if let Some(branches) = body.get_mut("branches").and_then(Value::as_array_mut) {
        for entry in branches.iter_mut() {
            let name = entry
                .get("branchName")
                .or_else(|| entry.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if let Some(name) = name {
                *entry = Value::String(name);
            }
        }
    }
    body
}

impl<T: TokenSource> ApiClient<T> {
    pub async fn get_profile(&self) -> ApiResult<ProfileDetails> {
        let req = self.builder(Method::GET, &["profile"]).await?;
        self.send_raw(req).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ProfileDetails> {
        let req = self.builder(Method::PUT, &["profile"]).await?.json(update);
        let profile: ProfileDetails = self.send_raw(req).await?;
        info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    pub async fn get_report_settings(&self) -> ApiResult<ReportSettings> {
        let req = self.builder(Method::GET, &["profile", "reports"]).await?;
        let body: Value = self.send_raw(req).await?;
        serde_json::from_value(normalize_report_branches(body)).map_err(ApiError::from)
    }

    pub async fn update_report_settings(&self, settings: &ReportSettings) -> ApiResult<ReportSettings> {
        let req = self
            .builder(Method::PUT, &["profile", "reports"])
            .await?
            .json(settings);
        let body: Value = self.send_raw(req).await?;
        info!(
            frequency = ?settings.frequency,
            recipients = settings.recipient_emails.len(),
            "Report settings saved"
        );
        serde_json::from_value(normalize_report_branches(body)).map_err(ApiError::from)
    }

    /// Branches the signed-in user may pick for reports.
    pub async fn list_profile_branches(&self) -> ApiResult<Vec<Branch>> {
        let req = self.builder(Method::GET, &["profile", "branches"]).await?;
        self.send_raw(req).await
    }
}
