//! # Dashboard Configuration
//!
//! Where the backend, identity service and profile service live, plus
//! display preferences.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_API_URL=https://api.tally.rw/                                │
//! │     TALLY_IDENTITY_API_KEY=...                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally/dashboard.toml (Linux)                             │
//! │     ~/Library/Application Support/rw.tally.dashboard/dashboard.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Local backend on :8000, public identity-toolkit endpoints          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://api.tally.rw/"
//! timeout_secs = 30
//!
//! [identity]
//! identity_url = "https://identitytoolkit.googleapis.com/"
//! token_url = "https://securetoken.googleapis.com/"
//! api_key = "AIza..."
//!
//! [profile]
//! base_url = "https://profiles.tally.rw/"
//!
//! [display]
//! currency = "RWF"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use tally_core::DEFAULT_CURRENCY;

use crate::error::{DashboardError, DashboardResult};

// =============================================================================
// Sections
// =============================================================================

/// Business backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// HTTP timeout shared by every client (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_api_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Identity service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySettings {
    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Web API key of the identity project. Required at bootstrap.
    #[serde(default)]
    pub api_key: String,
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/".to_string()
}

impl Default for IdentitySettings {
    fn default() -> Self {
        IdentitySettings {
            identity_url: default_identity_url(),
            token_url: default_token_url(),
            api_key: String::new(),
        }
    }
}

/// Profile service settings (user and business records).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default = "default_api_url")]
    pub base_url: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        ProfileSettings {
            base_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Currency label used for formatted amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub identity: IdentitySettings,

    #[serde(default)]
    pub profile: ProfileSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl DashboardConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (dashboard.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DashboardResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading dashboard config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load dashboard config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> DashboardResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DashboardError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Dashboard config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DashboardResult<()> {
        self.api_url()?;
        self.identity_url()?;
        self.token_url()?;
        self.profile_url()?;

        if self.api.timeout_secs == 0 {
            return Err(DashboardError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.display.currency.trim().is_empty() {
            return Err(DashboardError::InvalidConfig("currency must not be empty".into()));
        }
        Ok(())
    }

    /// Applies `TALLY_*` overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TALLY_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(url) = lookup("TALLY_IDENTITY_URL") {
            debug!(url = %url, "Overriding identity URL from environment");
            self.identity.identity_url = url;
        }

        if let Some(key) = lookup("TALLY_IDENTITY_API_KEY") {
            self.identity.api_key = key;
        }

        if let Some(url) = lookup("TALLY_PROFILE_URL") {
            debug!(url = %url, "Overriding profile URL from environment");
            self.profile.base_url = url;
        }

        if let Some(secs) = lookup("TALLY_HTTP_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric TALLY_HTTP_TIMEOUT_SECS"),
            }
        }

        if let Some(currency) = lookup("TALLY_CURRENCY") {
            self.display.currency = currency;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("rw", "tally", "dashboard")
            .map(|dirs| dirs.config_dir().join("dashboard.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn api_url(&self) -> DashboardResult<Url> {
        parse_base_url("api.base_url", &self.api.base_url)
    }

    pub fn identity_url(&self) -> DashboardResult<Url> {
        parse_base_url("identity.identity_url", &self.identity.identity_url)
    }

    pub fn token_url(&self) -> DashboardResult<Url> {
        parse_base_url("identity.token_url", &self.identity.token_url)
    }

    pub fn profile_url(&self) -> DashboardResult<Url> {
        parse_base_url("profile.base_url", &self.profile.base_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// Parses an http(s) base URL, adding the trailing slash relative joins need.
fn parse_base_url(field: &str, raw: &str) -> DashboardResult<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| DashboardError::InvalidConfig(format!("{field}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DashboardError::InvalidConfig(format!(
            "{field} must start with http:// or https://, got: {raw}"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
