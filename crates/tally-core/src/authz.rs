//! # Authorization Guard
//!
//! Pure predicates over the session role. The guard holds no state: callers
//! recompute capabilities from the current session on every check, so a role
//! change or sign-out is reflected immediately.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────────┬──────────┬──────────┬───────────────┐
//! │ role                 │ is_admin │ is_staff │ can_sell      │
//! ├──────────────────────┼──────────┼──────────┼───────────────┤
//! │ admin                │   yes    │    no    │     yes       │
//! │ staff                │    no    │   yes    │     yes       │
//! │ none (signed out)    │    no    │    no    │      no       │
//! └──────────────────────┴──────────┴──────────┴───────────────┘
//! ```
//!
//! Every privileged screen calls [`Capabilities::require_access`] on entry.
//! Hiding a navigation link is not enough.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

// =============================================================================
// Screens
// =============================================================================

/// Every screen of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Dashboard,
    ProductsStore,
    ProductsSold,
    ProductsRestored,
    Profile,
    Reports,
    Trash,
    ManageBranch,
    ManageEmployees,
}

impl Screen {
    /// All screens, in navigation order.
    pub const ALL: [Screen; 9] = [
        Screen::Dashboard,
        Screen::ProductsStore,
        Screen::ProductsSold,
        Screen::ProductsRestored,
        Screen::Profile,
        Screen::Reports,
        Screen::Trash,
        Screen::ManageBranch,
        Screen::ManageEmployees,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::ProductsStore => "Products Store",
            Screen::ProductsSold => "Products Sold",
            Screen::ProductsRestored => "Products Restored",
            Screen::Profile => "My Profile",
            Screen::Reports => "Reports",
            Screen::Trash => "Trash",
            Screen::ManageBranch => "Manage Branch",
            Screen::ManageEmployees => "Manage Employees",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Screen::Dashboard => "/dashboard",
            Screen::ProductsStore => "/products",
            Screen::ProductsSold => "/products-sold",
            Screen::ProductsRestored => "/products-restored",
            Screen::Profile => "/profile",
            Screen::Reports => "/reports",
            Screen::Trash => "/trash",
            Screen::ManageBranch => "/manage-branch",
            Screen::ManageEmployees => "/manage-employees",
        }
    }

    /// Screens only admins may open.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Screen::ManageBranch | Screen::ManageEmployees)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// What the current session may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub is_admin: bool,
    pub is_staff: bool,
    pub can_sell: bool,
}

impl Capabilities {
    /// Derives capabilities from the session role (`None` when signed out).
    pub fn from_role(role: Option<Role>) -> Self {
        let is_admin = role == Some(Role::Admin);
        let is_staff = role == Some(Role::Staff);
        Capabilities {
            is_admin,
            is_staff,
            can_sell: is_admin || is_staff,
        }
    }

    /// True if any recognized role is present.
    pub fn is_authenticated(&self) -> bool {
        self.is_admin || self.is_staff
    }

    pub fn can_access(&self, screen: Screen) -> bool {
        if screen.requires_admin() {
            self.is_admin
        } else {
            self.is_authenticated()
        }
    }

    /// Guards entry to a screen.
    pub fn require_access(&self, screen: Screen) -> CoreResult<()> {
        if self.can_access(screen) {
            return Ok(());
        }
        let reason = match screen {
            Screen::ManageBranch => "Only admins can manage branches.".to_string(),
            Screen::ManageEmployees => "Only admins can manage employees.".to_string(),
            _ => "Please sign in to continue.".to_string(),
        };
        Err(CoreError::AccessDenied { screen, reason })
    }

    /// Guards admin-only actions on otherwise shared screens (edit, delete).
    pub fn require_admin(&self, screen: Screen, action: &str) -> CoreResult<()> {
        if self.is_admin {
            return Ok(());
        }
        Err(CoreError::AccessDenied {
            screen,
            reason: format!("Only admins can {}.", action),
        })
    }

    /// Guards the sell actions.
    pub fn require_seller(&self, screen: Screen) -> CoreResult<()> {
        if self.can_sell {
            return Ok(());
        }
        Err(CoreError::AccessDenied {
            screen,
            reason: "Only admins and staff can sell products.".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
