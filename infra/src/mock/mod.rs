//! In-memory verification backend for development
//!
//! Behaves like the real service: codes expire after the TTL, a code can
//! be consumed once and failures come back as the legacy error texts,
//! classified through the same layer the HTTP transport uses. Issued codes
//! are logged so a developer can type them in.

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use eq_core::{ChallengeTicket, EnquiryDraft, RequestId, SubmitReceipt, TransportError, VerificationTransport};
use eq_shared::phone::{mask_phone_number, CanonicalPhone};
use eq_shared::ErrorResponse;

use crate::http::classify::classify_verify_error;

pub const MSG_EXPIRED: &str = "OTP has expired";
pub const MSG_INVALID: &str = "Invalid OTP code";
pub const MSG_NOT_FOUND: &str = "OTP not found or already used";

/// Default number of digits in a mock code
pub const DEFAULT_CODE_LENGTH: usize = 4;

#[derive(Debug, Clone)]
struct IssuedCode {
    phone: CanonicalPhone,
    code: String,
    expires_at: Instant,
}

/// Enquiry accepted by the mock backend
#[derive(Debug, Clone)]
pub struct StoredEnquiry {
    pub enquiry_id: String,
    pub draft: EnquiryDraft,
}

/// Mock verification backend
#[derive(Clone)]
pub struct MockVerificationTransport {
    codes: Arc<Mutex<HashMap<String, IssuedCode>>>,
    enquiries: Arc<Mutex<Vec<StoredEnquiry>>>,
    ttl: Duration,
    code_length: usize,
    simulate_failure: bool,
}

impl MockVerificationTransport {
    /// Create a mock backend issuing 4-digit codes that live for `ttl_seconds`
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_options(ttl_seconds, DEFAULT_CODE_LENGTH, false)
    }

    /// Create a mock backend with configurable options
    pub fn with_options(ttl_seconds: u64, code_length: usize, simulate_failure: bool) -> Self {
        Self {
            codes: Arc::new(Mutex::new(HashMap::new())),
            enquiries: Arc::new(Mutex::new(Vec::new())),
            ttl: Duration::from_secs(ttl_seconds),
            code_length: code_length.max(1),
            simulate_failure,
        }
    }

    /// Code currently outstanding for `request_id`
    pub fn peek_code(&self, request_id: &RequestId) -> Option<String> {
        self.lock_codes().get(request_id.as_str()).map(|c| c.code.clone())
    }

    /// Number of codes still held
    pub fn outstanding(&self) -> usize {
        self.lock_codes().len()
    }

    /// Enquiries stored so far
    pub fn enquiries(&self) -> Vec<StoredEnquiry> {
        self.enquiries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    fn lock_codes(&self) -> std::sync::MutexGuard<'_, HashMap<String, IssuedCode>> {
        // A poisoned map only means a panicking test; the data is still usable
        self.codes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generate_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.code_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    fn legacy_failure(message: &str) -> TransportError {
        classify_verify_error(400, &ErrorResponse::new(message))
    }
}

#[async_trait]
impl VerificationTransport for MockVerificationTransport {
    async fn request_challenge(
        &self,
        phone: &CanonicalPhone,
        _form: Option<&EnquiryDraft>,
    ) -> Result<ChallengeTicket, TransportError> {
        let masked = mask_phone_number(phone.as_str());
        if CanonicalPhone::parse(phone.as_str()).is_none() {
            return Err(TransportError::InvalidPhone { phone: masked });
        }
        if self.simulate_failure {
            warn!(phone = %masked, "Mock backend: simulated failure");
            return Err(TransportError::service("Failed to send OTP"));
        }

        let request_id = Uuid::new_v4().to_string();
        let code = self.generate_code();
        info!(
            phone = %masked,
            request_id = %request_id,
            code = %code,
            event = "mock_code_issued",
            "Mock verification code issued"
        );

        let mut codes = self.lock_codes();
        let now = Instant::now();
        let before = codes.len();
        codes.retain(|_, issued| issued.expires_at > now);
        if codes.len() < before {
            debug!(pruned = before - codes.len(), "Mock backend dropped expired codes");
        }
        codes.insert(
            request_id.clone(),
            IssuedCode {
                phone: phone.clone(),
                code,
                expires_at: now + self.ttl,
            },
        );
        drop(codes);

        Ok(ChallengeTicket {
            request_id: RequestId::new(request_id),
        })
    }

    async fn verify_code(&self, request_id: &RequestId, code: &str) -> Result<(), TransportError> {
        let mut codes = self.lock_codes();

        let Some(issued) = codes.get(request_id.as_str()).cloned() else {
            return Err(Self::legacy_failure(MSG_NOT_FOUND));
        };

        if Instant::now() >= issued.expires_at {
            codes.remove(request_id.as_str());
            return Err(Self::legacy_failure(MSG_EXPIRED));
        }

        if issued.code != code {
            return Err(Self::legacy_failure(MSG_INVALID));
        }

        codes.remove(request_id.as_str());
        info!(
            phone = %mask_phone_number(issued.phone.as_str()),
            request_id = %request_id,
            event = "mock_code_consumed",
            "Mock verification code consumed"
        );
        Ok(())
    }

    async fn submit_enquiry(&self, draft: &EnquiryDraft) -> Result<SubmitReceipt, TransportError> {
        if self.simulate_failure {
            return Err(TransportError::service("Failed to store enquiry"));
        }

        let enquiry_id = Uuid::new_v4().to_string();
        let mut enquiries = self
            .enquiries
            .lock()
            .map_err(|_| TransportError::service("Mock enquiry store unavailable"))?;
        enquiries.push(StoredEnquiry {
            enquiry_id: enquiry_id.clone(),
            draft: draft.clone(),
        });
        info!(enquiry_id = %enquiry_id, children = draft.children.len(), "Mock enquiry stored");

        Ok(SubmitReceipt {
            success: true,
            enquiry_id,
        })
    }
}

#[cfg(test)]
mod tests;
