//! Configuration for the verification session

use eq_shared::phone::PhoneValidator;
use eq_shared::{ResendPolicy, VerificationConfig};

/// Settings one session runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown length and lifetime of every issued code
    pub ttl_seconds: u64,
    /// Number of digit boxes on the entry screen
    pub otp_length: usize,
    /// When a replacement code may be requested
    pub resend_policy: ResendPolicy,
    /// Validator for the phone field on the form
    pub phone_validator: PhoneValidator,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for SessionConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            ttl_seconds: config.ttl_seconds,
            otp_length: config.otp_length,
            resend_policy: config.resend_policy,
            phone_validator: config.phone_validator(),
        }
    }
}
