//! User-facing messages for every classified failure

use super::types::TransportError;

pub const INVALID_CODE: &str = "Invalid code. Please check and try again.";
pub const CODE_EXPIRED: &str = "Your code has expired. Please request a new one.";
pub const CODE_NOT_FOUND: &str = "Code not found. Please request a new one.";
pub const VERIFY_FAILED: &str = "Verification failed. Please try again.";
pub const RESEND_FAILED: &str = "Failed to resend code. Please try again.";
pub const REQUEST_FAILED: &str = "Failed to send verification code. Please try again.";
pub const INVALID_PHONE: &str = "Invalid phone format. Must be E.164 format (+1234567890)";
pub const SUBMIT_FAILED: &str =
    "Your number was verified but the enquiry could not be submitted. Please try again.";
pub const SUBMITTED: &str =
    "Your enquiry has been submitted successfully. We will contact you soon!";
pub const CODE_RESENT: &str = "A new verification code has been sent to your phone.";

/// Message for a failed `verifyCode`
pub fn verify_failure(error: &TransportError) -> String {
    match error {
        TransportError::InvalidCode => INVALID_CODE.to_string(),
        TransportError::Expired => CODE_EXPIRED.to_string(),
        TransportError::NotFound => CODE_NOT_FOUND.to_string(),
        TransportError::InvalidPhone { .. } => INVALID_PHONE.to_string(),
        TransportError::Service { .. } => VERIFY_FAILED.to_string(),
    }
}

/// Message for a failed first `requestChallenge`
pub fn request_failure(error: &TransportError) -> String {
    match error {
        TransportError::InvalidPhone { .. } => INVALID_PHONE.to_string(),
        other => other
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| REQUEST_FAILED.to_string()),
    }
}

/// Message for a failed resend
pub fn resend_failure(error: &TransportError) -> String {
    match error {
        TransportError::InvalidPhone { .. } => INVALID_PHONE.to_string(),
        other => other
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| RESEND_FAILED.to_string()),
    }
}

/// Message for a failed `submitEnquiry` after a successful verification
pub fn submit_failure(_error: &TransportError) -> String {
    SUBMIT_FAILED.to_string()
}

/// Message asking for the remaining digits
pub fn incomplete_code(expected: usize) -> String {
    format!("Please enter the complete {}-digit code", expected)
}
