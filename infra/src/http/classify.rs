//! Maps backend error bodies onto [`TransportError`]
//!
//! A structured `code` in the body always wins. Older servers only send
//! free text in `error`; for those the verify path falls back to substring
//! matching. Nothing outside this module looks at message text.

use eq_core::TransportError;
use eq_shared::{error_codes, ErrorResponse};

// Legacy codes still sent by older deployments
const LEGACY_EXPIRED: &str = "VERIFICATION_CODE_EXPIRED";
const LEGACY_INVALID: &str = "INVALID_VERIFICATION_CODE";
const LEGACY_NOT_FOUND: &str = "VERIFICATION_CODE_NOT_FOUND";

/// Error from `POST /request`
pub fn classify_request_error(status: u16, body: &ErrorResponse, masked_phone: &str) -> TransportError {
    match body.code.as_deref() {
        Some(error_codes::INVALID_PHONE) => TransportError::InvalidPhone {
            phone: masked_phone.to_string(),
        },
        _ => service_error(status, body),
    }
}

/// Error from `POST /verify`
pub fn classify_verify_error(status: u16, body: &ErrorResponse) -> TransportError {
    if let Some(error) = from_code(body.code.as_deref()) {
        return error;
    }
    from_legacy_message(&body.error).unwrap_or_else(|| service_error(status, body))
}

/// Error from `POST /submit`
pub fn classify_submit_error(status: u16, body: &ErrorResponse) -> TransportError {
    service_error(status, body)
}

fn from_code(code: Option<&str>) -> Option<TransportError> {
    match code? {
        error_codes::OTP_EXPIRED | LEGACY_EXPIRED => Some(TransportError::Expired),
        error_codes::OTP_INVALID | LEGACY_INVALID => Some(TransportError::InvalidCode),
        error_codes::OTP_NOT_FOUND | LEGACY_NOT_FOUND => Some(TransportError::NotFound),
        _ => None,
    }
}

/// Substring fallback for servers that only send text
pub fn from_legacy_message(message: &str) -> Option<TransportError> {
    let lower = message.to_lowercase();
    if lower.contains("expired") {
        Some(TransportError::Expired)
    } else if lower.contains("not found") {
        Some(TransportError::NotFound)
    } else if lower.contains("invalid") {
        Some(TransportError::InvalidCode)
    } else {
        None
    }
}

fn service_error(status: u16, body: &ErrorResponse) -> TransportError {
    tracing::debug!(status, code = ?body.code, "Unclassified backend error");
    TransportError::service(body.error.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_code_wins_over_text() {
        let body = ErrorResponse::with_code(error_codes::OTP_EXPIRED, "Invalid request");
        assert_eq!(classify_verify_error(400, &body), TransportError::Expired);

        let body = ErrorResponse::with_code(LEGACY_INVALID, "");
        assert_eq!(classify_verify_error(400, &body), TransportError::InvalidCode);
    }

    #[test]
    fn test_legacy_messages() {
        assert_eq!(from_legacy_message("OTP has expired"), Some(TransportError::Expired));
        assert_eq!(from_legacy_message("Invalid OTP"), Some(TransportError::InvalidCode));
        assert_eq!(from_legacy_message("Invalid OTP code"), Some(TransportError::InvalidCode));
        assert_eq!(
            from_legacy_message("OTP not found or already used"),
            Some(TransportError::NotFound)
        );
        assert_eq!(from_legacy_message("Internal server error"), None);
    }

    #[test]
    fn test_unknown_code_falls_back_to_text_then_service() {
        let body = ErrorResponse::with_code("SOMETHING_ELSE", "code expired");
        assert_eq!(classify_verify_error(400, &body), TransportError::Expired);

        let body = ErrorResponse::new("Database unavailable");
        assert_eq!(
            classify_verify_error(503, &body),
            TransportError::service("Database unavailable")
        );
    }

    #[test]
    fn test_request_and_submit_never_use_text_matching() {
        let body = ErrorResponse::new("Invalid phone number");
        assert_eq!(
            classify_request_error(400, &body, "+1******2671"),
            TransportError::service("Invalid phone number")
        );

        let body = ErrorResponse::with_code(error_codes::INVALID_PHONE, "bad phone");
        assert!(matches!(
            classify_request_error(400, &body, "+1******2671"),
            TransportError::InvalidPhone { .. }
        ));

        let body = ErrorResponse::new("OTP has expired");
        assert_eq!(
            classify_submit_error(500, &body),
            TransportError::service("OTP has expired")
        );
    }
}
