//! # Dashboard Commands
//!
//! One async function per screen action, called by the web shell.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (shared payloads)
//! ├── auth.rs       ◄─── Login, logout, reset, session snapshot
//! ├── branches.rs   ◄─── Manage Branch (admin)
//! ├── employees.rs  ◄─── Manage Employees (admin)
//! ├── store.rs      ◄─── Products Store: list, sell, edit, export
//! ├── sold.rs       ◄─── Products Sold: filter, payments, export
//! ├── restored.rs   ◄─── Products Restored: sell, delete, export
//! ├── trash.rs      ◄─── Trash: restore, purge
//! ├── profile.rs    ◄─── My Profile and report settings
//! ├── reports.rs    ◄─── Dashboard figures
//! └── search.rs     ◄─── Navigation search
//! ```
//!
//! ## Command Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  async fn create_branch(app: &Dashboard, form: BranchForm)             │
//! │      -> Result<Branch, ScreenError>                                    │
//! │                                                                         │
//! │  1. app.enter(Screen::ManageBranch)?   guard, no request on failure    │
//! │  2. validate_branch_form(&form)?       no request on failure           │
//! │  3. app.api().create_branch(&form)     bearer from the session         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod branches;
pub mod employees;
pub mod profile;
pub mod reports;
pub mod restored;
pub mod search;
pub mod sold;
pub mod store;
pub mod trash;

use serde::Serialize;
use tally_core::export::{to_csv, CsvTable};

use crate::error::ScreenError;

/// A rendered CSV download.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

impl CsvExport {
    pub(crate) fn render<T: CsvTable>(rows: &[T]) -> Result<Self, ScreenError> {
        Ok(CsvExport {
            file_name: T::FILE_NAME.to_string(),
            content: to_csv(rows)?,
        })
    }
}
