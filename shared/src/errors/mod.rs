//! Shared error body exchanged with the verification backend

use serde::{Deserialize, Serialize};

/// Error body returned by the backend with every non-2xx response
///
/// Legacy deployments only send `error`; newer ones add a structured `code`
/// drawn from [`error_codes`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    #[serde(default)]
    pub error: String,

    /// Structured error code for programmatic handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a legacy error body carrying only a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    /// Create an error body with a structured code
    pub fn with_code(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Structured error codes understood by the client
pub mod error_codes {
    pub const OTP_EXPIRED: &str = "OTP_EXPIRED";
    pub const OTP_INVALID: &str = "OTP_INVALID";
    pub const OTP_NOT_FOUND: &str = "OTP_NOT_FOUND";
    pub const INVALID_PHONE: &str = "INVALID_PHONE";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
