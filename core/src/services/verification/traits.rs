//! Transport seam between the session and the verification backend

use async_trait::async_trait;

use eq_shared::phone::CanonicalPhone;

use super::types::{ChallengeTicket, SubmitReceipt};
use crate::domain::entities::{EnquiryDraft, RequestId};
use crate::errors::TransportError;

/// The three round trips of the verification protocol
///
/// Each call is a single request with no implicit retry. Implementations
/// classify every failure into a [`TransportError`].
#[async_trait]
pub trait VerificationTransport: Send + Sync {
    /// Ask the backend to send a code to `phone`
    ///
    /// `form` is forwarded as extra form data when present.
    async fn request_challenge(
        &self,
        phone: &CanonicalPhone,
        form: Option<&EnquiryDraft>,
    ) -> Result<ChallengeTicket, TransportError>;

    /// Check `code` against the challenge identified by `request_id`
    async fn verify_code(&self, request_id: &RequestId, code: &str) -> Result<(), TransportError>;

    /// Store the enquiry; only called after a successful verification
    async fn submit_enquiry(&self, draft: &EnquiryDraft) -> Result<SubmitReceipt, TransportError>;
}
