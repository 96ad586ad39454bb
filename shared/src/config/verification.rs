//! Verification flow configuration

use serde::{Deserialize, Serialize};
use std::env;

use crate::utils::phone::{PhoneEntryFormat, PhoneValidator, DEFAULT_DIAL_PREFIX};

/// Default lifetime of an issued code (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Number of digit boxes on the enquiry form's verification screen
pub const DEFAULT_FORM_OTP_LENGTH: usize = 4;

/// When the user may ask for a replacement code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResendPolicy {
    /// Only once the current code has expired
    #[default]
    AfterExpiry,
    /// Also while a code is live, once `seconds` have passed since it was issued
    AfterCooldown { seconds: u64 },
}

/// Settings for the phone-verification flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Lifetime of a code and starting value of the countdown
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Number of digit boxes shown on the entry screen
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,

    /// Code length the transport checks before sending
    #[serde(default = "default_otp_length")]
    pub transport_otp_length: usize,

    /// Dialing prefix added to grouped local numbers
    #[serde(default = "default_dial_prefix")]
    pub dial_prefix: String,

    /// Entry formats accepted on the phone field
    #[serde(default)]
    pub phone_format: PhoneEntryFormat,

    /// Resend gating
    #[serde(default)]
    pub resend_policy: ResendPolicy,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            otp_length: default_otp_length(),
            transport_otp_length: default_otp_length(),
            dial_prefix: default_dial_prefix(),
            phone_format: PhoneEntryFormat::default(),
            resend_policy: ResendPolicy::default(),
        }
    }
}

impl VerificationConfig {
    /// Load from flat environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let resend_policy = match env::var("RESEND_COOLDOWN_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            Some(seconds) => ResendPolicy::AfterCooldown { seconds },
            None => defaults.resend_policy,
        };

        let otp_length = parse_env("OTP_LENGTH").unwrap_or(defaults.otp_length);

        Self {
            ttl_seconds: parse_env("OTP_TTL_SECONDS").unwrap_or(defaults.ttl_seconds),
            otp_length,
            // Follows the screen unless set explicitly
            transport_otp_length: parse_env("TRANSPORT_OTP_LENGTH").unwrap_or(otp_length),
            dial_prefix: env::var("PHONE_DIAL_PREFIX").unwrap_or(defaults.dial_prefix),
            phone_format: env::var("PHONE_ENTRY_FORMAT")
                .ok()
                .and_then(|v| match v.to_lowercase().as_str() {
                    "grouped" => Some(PhoneEntryFormat::Grouped),
                    "international" => Some(PhoneEntryFormat::International),
                    "any" => Some(PhoneEntryFormat::Any),
                    _ => None,
                })
                .unwrap_or(defaults.phone_format),
            resend_policy,
        }
    }

    /// Phone validator for the configured entry screen
    pub fn phone_validator(&self) -> PhoneValidator {
        PhoneValidator::new(self.phone_format, self.dial_prefix.clone())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn default_otp_length() -> usize {
    DEFAULT_FORM_OTP_LENGTH
}

fn default_dial_prefix() -> String {
    String::from(DEFAULT_DIAL_PREFIX)
}
