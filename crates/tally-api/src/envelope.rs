//! Response envelope shared by the backend endpoints.
//!
//! ```text
//! { "success": true,  "data": { "branches": [...] }, "message": "..." }
//! { "success": false, "message": "Branch already exists" }
//! { "detail": "Branch not found" }                        ◄── framework errors
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiResponse<T> {
    /// Message to show for a failed call: `message`, else a string `detail`.
    pub fn error_message(&self) -> Option<String> {
        self.message.clone().or_else(|| match &self.detail {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            _ => None,
        })
    }

    /// Payload of a successful call.
    pub fn into_data(self, status: u16) -> ApiResult<T> {
        if !self.success {
            return Err(ApiError::backend(status, self.error_message()));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response has no data".to_string()))
    }
}

/// Extracts the user-facing message from a failed response body.
pub fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|r| r.error_message())
}

/// Decodes an envelope body.
pub fn decode<T: DeserializeOwned>(body: &str, status: u16) -> ApiResult<T> {
    serde_json::from_str::<ApiResponse<T>>(body)?.into_data(status)
}
