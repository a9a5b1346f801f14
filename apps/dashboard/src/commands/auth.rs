//! # Auth Commands
//!
//! Login, logout and password reset. Failures carry the user-facing message
//! from the session manager.

use tracing::{debug, info};

use tally_core::validation::validate_email;
use tally_session::{AuthError, SessionSnapshot};

use crate::error::ScreenError;
use crate::state::Dashboard;

pub const RESET_SENT_MESSAGE: &str = "Password reset email sent. Check your inbox.";

/// Current session for the shell's auth context.
pub async fn get_session(app: &Dashboard) -> SessionSnapshot {
    app.session().snapshot().await
}

pub async fn login(app: &Dashboard, email: String, password: String) -> Result<SessionSnapshot, ScreenError> {
    debug!("login command");
    let session = app.session().try_login(email.trim(), &password).await?;
    info!(uid = %session.principal.uid, role = %session.profile.role, "Signed in");
    Ok(app.session().snapshot().await)
}

pub async fn login_with_federated_provider(app: &Dashboard) -> Result<SessionSnapshot, ScreenError> {
    debug!("login_with_federated_provider command");
    app.session().try_login_with_federated_provider().await?;
    Ok(app.session().snapshot().await)
}

pub async fn logout(app: &Dashboard) -> Result<(), ScreenError> {
    debug!("logout command");
    app.session().logout().await?;
    Ok(())
}

/// Sends a reset email and returns the confirmation to show.
pub async fn reset_password(app: &Dashboard, email: String) -> Result<String, ScreenError> {
    let email = email.trim();
    validate_email(email).map_err(|_| ScreenError::from(AuthError::InvalidEmail))?;
    app.session().reset_password(email).await?;
    Ok(RESET_SENT_MESSAGE.to_string())
}

/// Dismisses the last auth error banner.
pub async fn clear_auth_error(app: &Dashboard) {
    app.session().clear_error().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::TestApp;

    #[tokio::test]
    async fn test_login_and_logout() {
        let t = TestApp::start().await;

        let snapshot = login(&t.app, "admin@shop.rw".into(), "secret".into()).await.unwrap();
        assert!(snapshot.is_admin);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.user.map(|u| u.full_name), Some("Aline Uwase".to_string()));

        logout(&t.app).await.unwrap();
        let snapshot = get_session(&t.app).await;
        assert!(snapshot.user.is_none());
        assert!(!snapshot.can_sell);
    }

    #[tokio::test]
    async fn test_login_failure_carries_message() {
        let t = TestApp::start().await;

        let err = login(&t.app, "admin@shop.rw".into(), "wrong".into()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentityError);
        assert_eq!(err.message, "Incorrect password.");
        assert_eq!(get_session(&t.app).await.error.as_deref(), Some("Incorrect password."));

        clear_auth_error(&t.app).await;
        assert!(get_session(&t.app).await.error.is_none());

        let err = login(&t.app, "admin".into(), "secret".into()).await.unwrap_err();
        assert_eq!(err.message, "Use your email address.");
    }

    #[tokio::test]
    async fn test_reset_password() {
        let t = TestApp::start().await;

        let msg = reset_password(&t.app, " staff@shop.rw ".into()).await.unwrap();
        assert_eq!(msg, RESET_SENT_MESSAGE);
        assert_eq!(t.provider.reset_requests().await, vec!["staff@shop.rw"]);

        let err = reset_password(&t.app, "nope".into()).await.unwrap_err();
        assert_eq!(err.message, "Invalid email.");

        let err = reset_password(&t.app, "ghost@shop.rw".into()).await.unwrap_err();
        assert_eq!(err.message, "No account found.");
    }
}
