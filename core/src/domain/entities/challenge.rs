//! Verification challenge: one outstanding code on the server.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use eq_shared::phone::CanonicalPhone;

/// Opaque identifier the server binds a code to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A challenge is replaced on resend, never mutated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChallenge {
    pub request_id: RequestId,
    pub phone: CanonicalPhone,
    pub issued_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl VerificationChallenge {
    pub fn new(request_id: RequestId, phone: CanonicalPhone, issued_at: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            request_id,
            phone,
            issued_at,
            ttl_seconds,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.ttl_seconds as i64)
    }

    /// Whole seconds left at `now`, never negative
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at() - now).num_seconds().max(0) as u64
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
