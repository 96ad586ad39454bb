//! Error taxonomy for the verification flow
//!
//! Transport failures are classified into a closed set of kinds. The session
//! maps each kind to exactly one user-facing message; anything it cannot
//! classify falls back to a generic "try again" message.

use thiserror::Error;

/// Classified failure of one transport round trip
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The phone number failed the pre-flight format check
    #[error("Invalid phone format: {phone}")]
    InvalidPhone { phone: String },

    /// The server rejected the code
    #[error("Invalid verification code")]
    InvalidCode,

    /// The challenge's TTL elapsed on the server
    #[error("Verification code expired")]
    Expired,

    /// The server has no outstanding challenge for the request id
    #[error("Verification request not found")]
    NotFound,

    /// Non-2xx response or network failure with opaque text
    #[error("Service error: {message}")]
    Service { message: String },
}

impl TransportError {
    /// Create a service error from any message
    pub fn service(message: impl Into<String>) -> Self {
        TransportError::Service {
            message: message.into(),
        }
    }

    /// The classified kind of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::InvalidPhone { .. } => ErrorKind::InvalidPhone,
            TransportError::InvalidCode => ErrorKind::InvalidCode,
            TransportError::Expired => ErrorKind::Expired,
            TransportError::NotFound => ErrorKind::NotFound,
            TransportError::Service { .. } => ErrorKind::ServiceError,
        }
    }

    /// Server-supplied text for service errors, if any was given
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Service { message } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Flat classification used for logging and message lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InvalidPhone,
    InvalidCode,
    Expired,
    NotFound,
    ServiceError,
    DoubleSubmitPrevented,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::InvalidPhone => "invalid_phone",
            ErrorKind::InvalidCode => "invalid_code",
            ErrorKind::Expired => "expired",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ServiceError => "service_error",
            ErrorKind::DoubleSubmitPrevented => "double_submit_prevented",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
