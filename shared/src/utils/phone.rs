//! Phone number utilities
//!
//! Two entry formats are recognised: the grouped local form typed on the
//! enquiry screen (`XXX-XXX-XXXX`) and the fully-qualified international
//! form (`+` followed by up to 15 digits) that the backend dials.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// Grouped local number, 3-3-4 digits
static GROUPED_LOCAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap()
});

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").unwrap()
});

/// Default dialing prefix prepended to grouped local numbers
pub const DEFAULT_DIAL_PREFIX: &str = "+1";

/// Which entry formats a screen accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneEntryFormat {
    /// Grouped local form only (`XXX-XXX-XXXX`)
    Grouped,
    /// International form only (`+1234567890`)
    International,
    /// Either of the two
    #[default]
    Any,
}

/// Why a raw phone entry was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Nothing was entered
    Empty,
    /// The entry matches none of the accepted formats
    InvalidFormat { format: PhoneEntryFormat },
}

impl PhoneError {
    /// Message shown next to the phone field
    pub fn user_message(&self) -> &'static str {
        match self {
            PhoneError::Empty => "Please enter contact number",
            PhoneError::InvalidFormat { format: PhoneEntryFormat::International } => {
                "Please enter a valid phone number in international format (+1234567890)"
            }
            PhoneError::InvalidFormat { .. } => {
                "Please enter a valid phone number in format XXX-XXX-XXXX"
            }
        }
    }
}

impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for PhoneError {}

/// A phone number in the single international dialing format used on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPhone(String);

impl CanonicalPhone {
    /// Wrap an already canonical string, rejecting anything else
    pub fn parse(value: &str) -> Option<Self> {
        if is_valid_international_phone(value) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert back to the grouped display form if the number belongs to `dial_prefix`
    pub fn to_grouped(&self, dial_prefix: &str) -> Option<String> {
        let local = self.0.strip_prefix(dial_prefix)?;
        if local.len() == 10 && local.chars().all(|c| c.is_ascii_digit()) {
            Some(format!("{}-{}-{}", &local[0..3], &local[3..6], &local[6..10]))
        } else {
            None
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates raw phone entries for one screen and converts them to canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneValidator {
    format: PhoneEntryFormat,
    dial_prefix: String,
}

impl PhoneValidator {
    pub fn new(format: PhoneEntryFormat, dial_prefix: impl Into<String>) -> Self {
        Self {
            format,
            dial_prefix: dial_prefix.into(),
        }
    }

    pub fn format(&self) -> PhoneEntryFormat {
        self.format
    }

    pub fn dial_prefix(&self) -> &str {
        &self.dial_prefix
    }

    /// Validate a raw entry and return the canonical dialable form
    ///
    /// The raw value is matched as typed; no trimming or reformatting happens
    /// before the pattern check.
    pub fn validate(&self, raw: &str) -> Result<CanonicalPhone, PhoneError> {
        if raw.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        let accepts_grouped = matches!(self.format, PhoneEntryFormat::Grouped | PhoneEntryFormat::Any);
        let accepts_international =
            matches!(self.format, PhoneEntryFormat::International | PhoneEntryFormat::Any);

        if accepts_grouped && is_grouped_local(raw) {
            let digits = normalize_phone_number(raw);
            return CanonicalPhone::parse(&format!("{}{}", self.dial_prefix, digits))
                .ok_or(PhoneError::InvalidFormat { format: self.format });
        }

        if accepts_international && is_valid_international_phone(raw) {
            return Ok(CanonicalPhone(raw.to_string()));
        }

        Err(PhoneError::InvalidFormat { format: self.format })
    }
}

impl Default for PhoneValidator {
    fn default() -> Self {
        Self::new(PhoneEntryFormat::Any, DEFAULT_DIAL_PREFIX)
    }
}

/// Validate a raw entry with the default validator (either format, `+1` prefix)
pub fn validate_phone(raw: &str) -> Result<CanonicalPhone, PhoneError> {
    PhoneValidator::default().validate(raw)
}

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is in the grouped local form (`XXX-XXX-XXXX`)
pub fn is_grouped_local(phone: &str) -> bool {
    GROUPED_LOCAL_REGEX.is_match(phone)
}

/// Check if a phone number is valid (international E.164 format)
pub fn is_valid_international_phone(phone: &str) -> bool {
    INTERNATIONAL_PHONE_REGEX.is_match(phone)
}

/// Mask a phone number for logs (e.g., +1*******7890)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        let visible_prefix = if normalized.starts_with('+') { 2 } else { 3 };
        let hidden = normalized.len() - visible_prefix - 4;
        format!(
            "{}{}{}",
            &normalized[..visible_prefix],
            "*".repeat(hidden),
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
