//! Shared utilities and common types for the enquiry verification client
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Wire error body shared by the transport and its test backends
//! - Utility functions (phone validation, field validation)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    ApiClientConfig, AppConfig, ConfigError, Environment, LogFormat, LoggingConfig,
    PhoneEntryFormat, ResendPolicy, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::{phone, validation};
