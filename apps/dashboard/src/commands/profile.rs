//! # My Profile Commands
//!
//! Profile details and the scheduled report settings shown on the same page.
//! A saved profile is also patched into the live session so the header
//! picks up the new name and photo without a sign-in round trip.

use tracing::{debug, info};

use tally_api::{ProfileDetails, ProfileUpdate};
use tally_core::authz::Screen;
use tally_core::reports::ReportSettings;
use tally_core::validation::validate_profile_form;
use tally_core::{Branch, ProfileForm, ProfilePatch};

use crate::error::ScreenError;
use crate::state::Dashboard;

pub async fn get_profile(app: &Dashboard) -> Result<ProfileDetails, ScreenError> {
    app.enter(Screen::Profile).await?;
    Ok(app.api().get_profile().await?)
}

pub async fn update_profile(app: &Dashboard, form: ProfileForm) -> Result<ProfileDetails, ScreenError> {
    debug!(email = %form.email, "update_profile command");
    app.enter(Screen::Profile).await?;
    validate_profile_form(&form)?;

    let saved = app.api().update_profile(&ProfileUpdate::from(form)).await?;
    let patch = ProfilePatch {
        first_name: Some(saved.first_name.clone()),
        last_name: Some(saved.last_name.clone()),
        phone: Some(saved.phone.clone()).filter(|p| !p.is_empty()),
        profile_image: saved.profile_image.clone(),
        ..ProfilePatch::default()
    };
    if !app.session().update_user(patch).await {
        info!(user_id = %saved.id, "Profile saved after sign-out; session not patched");
    }
    Ok(saved)
}

pub async fn list_profile_branches(app: &Dashboard) -> Result<Vec<Branch>, ScreenError> {
    app.enter(Screen::Profile).await?;
    Ok(app.api().list_profile_branches().await?)
}

pub async fn get_report_settings(app: &Dashboard) -> Result<ReportSettings, ScreenError> {
    app.enter(Screen::Profile).await?;
    Ok(app.api().get_report_settings().await?)
}

pub async fn save_report_settings(app: &Dashboard, settings: ReportSettings) -> Result<ReportSettings, ScreenError> {
    debug!(frequency = ?settings.frequency, "save_report_settings command");
    app.enter(Screen::Profile).await?;
    settings.validate()?;
    Ok(app.api().update_report_settings(&settings).await?)
}

/// Adds a branch to the unsaved settings. Admin only.
pub async fn add_report_branch(
    app: &Dashboard,
    mut settings: ReportSettings,
    branch: String,
) -> Result<ReportSettings, ScreenError> {
    let caps = app.enter(Screen::Profile).await?;
    settings.add_branch(&branch, &caps)?;
    Ok(settings)
}

pub async fn add_report_recipient(
    app: &Dashboard,
    mut settings: ReportSettings,
    email: String,
) -> Result<ReportSettings, ScreenError> {
    app.enter(Screen::Profile).await?;
    settings.add_recipient(&email)?;
    Ok(settings)
}
