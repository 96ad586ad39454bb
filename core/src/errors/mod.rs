//! Domain-specific error types and error handling.

pub mod messages;
mod types;

pub use eq_shared::validation::ValidationErrors;
pub use types::{ErrorKind, TransportError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Client-detected field errors; never reaches the network
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Classified transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Submit requested before every digit box was filled
    #[error("Incomplete code: expected {expected} digits")]
    IncompleteCode { expected: usize },

    /// A verify or submit round trip is already in flight
    #[error("Request already in flight")]
    DoubleSubmitPrevented,

    /// Resend asked for while the resend policy forbids it
    #[error("Resend unavailable")]
    ResendUnavailable { available_in_seconds: Option<u64> },

    /// Event that has no meaning in the current state
    #[error("Event {event} is not valid in state {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

impl DomainError {
    /// The classified kind, when this error has one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DomainError::Validation(_) => Some(ErrorKind::Validation),
            DomainError::Transport(e) => Some(e.kind()),
            DomainError::DoubleSubmitPrevented => Some(ErrorKind::DoubleSubmitPrevented),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// An error attached to the session together with the text shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub cause: DomainError,
    pub message: String,
}

impl SessionError {
    pub fn new(cause: impl Into<DomainError>, message: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
