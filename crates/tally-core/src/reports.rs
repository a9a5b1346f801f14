//! # Report Settings
//!
//! Scheduled report preferences edited from the profile screen.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::authz::{Capabilities, Screen};
use crate::error::{CoreResult, ValidationError};
use crate::validation::{validate_email, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Product statuses a report can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReportScope {
    Store,
    Sold,
    Restored,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    #[serde(default)]
    pub frequency: ReportFrequency,
    /// Local delivery time, `HH:MM`.
    #[serde(default = "default_time")]
    pub time: String,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub product_statuses: Vec<ReportScope>,
    #[serde(default)]
    pub recipient_emails: Vec<String>,
}

fn default_time() -> String {
    "08:00".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            frequency: ReportFrequency::default(),
            time: default_time(),
            branches: Vec::new(),
            product_statuses: Vec::new(),
            recipient_emails: Vec::new(),
        }
    }
}

impl ReportSettings {
    /// Adds a recipient. Rejects malformed and duplicate addresses.
    pub fn add_recipient(&mut self, email: &str) -> ValidationResult<()> {
        let email = email.trim();
        validate_email(email)?;
        if self.recipient_emails.iter().any(|e| e == email) {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email.to_string(),
            });
        }
        self.recipient_emails.push(email.to_string());
        Ok(())
    }

    pub fn remove_recipient(&mut self, email: &str) {
        self.recipient_emails.retain(|e| e != email);
    }

    /// Adds a branch to the report scope. Admin only.
    pub fn add_branch(&mut self, branch: &str, caps: &Capabilities) -> CoreResult<()> {
        caps.require_admin(Screen::Profile, "add branches to report settings")?;
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(ValidationError::Required {
                field: "Branch".to_string(),
            }
            .into());
        }
        if !self.branches.iter().any(|b| b == branch) {
            self.branches.push(branch.to_string());
        }
        Ok(())
    }

    /// Checks the settings before they are saved.
    pub fn validate(&self) -> ValidationResult<()> {
        let valid_time = self
            .time
            .split_once(':')
            .and_then(|(h, m)| Some((h.parse::<u8>().ok()?, m.parse::<u8>().ok()?)))
            .map(|(h, m)| h < 24 && m < 60)
            .unwrap_or(false);
        if !valid_time {
            return Err(ValidationError::InvalidFormat {
                field: "time".to_string(),
                reason: "expected HH:MM".to_string(),
            });
        }
        for email in &self.recipient_emails {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_recipients() {
        let mut settings = ReportSettings::default();
        settings.add_recipient("owner@shop.rw").unwrap();
        assert!(matches!(
            settings.add_recipient("owner@shop.rw"),
            Err(ValidationError::Duplicate { .. })
        ));
        assert!(settings.add_recipient("not-an-email").is_err());

        settings.remove_recipient("owner@shop.rw");
        assert!(settings.recipient_emails.is_empty());
    }

    #[test]
    fn test_add_branch_is_admin_only() {
        let mut settings = ReportSettings::default();
        let staff = Capabilities::from_role(Some(Role::Staff));
        let err = settings.add_branch("Remera", &staff).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You are not authorized to access this page. Only admins can add branches to report settings."
        );

        let admin = Capabilities::from_role(Some(Role::Admin));
        settings.add_branch("Remera", &admin).unwrap();
        settings.add_branch("Remera", &admin).unwrap();
        assert_eq!(settings.branches, vec!["Remera"]);
    }

    #[test]
    fn test_validate_time() {
        let mut settings = ReportSettings::default();
        assert!(settings.validate().is_ok());
        settings.time = "25:00".into();
        assert!(settings.validate().is_err());
        settings.time = "soon".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "frequency": "daily",
            "time": "18:30",
            "branches": ["Main"],
            "productStatuses": ["sold", "restored"],
            "recipientEmails": []
        }"#;
        let settings: ReportSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.frequency, ReportFrequency::Daily);
        assert_eq!(settings.product_statuses, vec![ReportScope::Sold, ReportScope::Restored]);
    }
}
