//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `client` - Backend URL, API key and endpoint paths
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Code lifetime, code length, phone format and resend gating

pub mod client;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export commonly used types
pub use crate::utils::phone::PhoneEntryFormat;
pub use client::ApiClientConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::{ResendPolicy, VerificationConfig};

/// Prefix of nested environment overrides, e.g. `ENQUIRY_API__BASE_URL`
pub const ENV_PREFIX: &str = "ENQUIRY";

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Backend client configuration
    #[serde(default)]
    pub api: ApiClientConfig,

    /// Verification flow configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            api: ApiClientConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from flat environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|v| v.parse().ok()) {
            logging.format = format;
        }

        Self {
            environment,
            api: ApiClientConfig::from_env(),
            verification: VerificationConfig::from_env(),
            logging,
        }
    }

    /// Load configuration from an optional TOML file layered under
    /// `ENQUIRY_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the verification flow cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verification.ttl_seconds == 0 {
            return Err(ConfigError::Invalid("verification.ttl_seconds must be positive".into()));
        }
        if self.verification.otp_length == 0 || self.verification.transport_otp_length == 0 {
            return Err(ConfigError::Invalid("OTP lengths must be positive".into()));
        }
        if self.verification.otp_length != self.verification.transport_otp_length {
            return Err(ConfigError::Invalid(format!(
                "verification.otp_length ({}) must match verification.transport_otp_length ({})",
                self.verification.otp_length, self.verification.transport_otp_length
            )));
        }
        if !self.verification.dial_prefix.starts_with('+') {
            return Err(ConfigError::Invalid(format!(
                "verification.dial_prefix must start with '+': {}",
                self.verification.dial_prefix
            )));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL: {}",
                self.api.base_url
            )));
        }
        Ok(())
    }
}
