//! Domain entities representing core business objects.

pub mod challenge;
pub mod enquiry;

// Re-export commonly used types
pub use challenge::{RequestId, VerificationChallenge};
pub use enquiry::{ChildRecord, EnquiryDraft, EnquirySnapshot, Program, MAX_CHILDREN};
