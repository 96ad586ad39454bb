//! Tests for the mock verification backend

use std::time::Duration;

use super::*;

fn phone() -> CanonicalPhone {
    CanonicalPhone::parse("+14155552671").unwrap()
}

#[tokio::test]
async fn test_issues_four_digit_code_and_consumes_once() {
    let backend = MockVerificationTransport::new(300);
    let ticket = backend.request_challenge(&phone(), None).await.unwrap();

    let code = backend.peek_code(&ticket.request_id).unwrap();
    assert_eq!(code.len(), 4);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert!(Uuid::parse_str(ticket.request_id.as_str()).is_ok());

    assert_eq!(backend.verify_code(&ticket.request_id, &code).await, Ok(()));
    assert_eq!(
        backend.verify_code(&ticket.request_id, &code).await,
        Err(TransportError::NotFound)
    );
}

#[tokio::test]
async fn test_wrong_code_keeps_challenge_alive() {
    let backend = MockVerificationTransport::with_options(300, 6, false);
    let ticket = backend.request_challenge(&phone(), None).await.unwrap();
    let code = backend.peek_code(&ticket.request_id).unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    assert_eq!(
        backend.verify_code(&ticket.request_id, wrong).await,
        Err(TransportError::InvalidCode)
    );
    assert_eq!(backend.verify_code(&ticket.request_id, &code).await, Ok(()));
}

#[tokio::test(start_paused = true)]
async fn test_code_expires_after_ttl() {
    let backend = MockVerificationTransport::new(300);
    let ticket = backend.request_challenge(&phone(), None).await.unwrap();
    let code = backend.peek_code(&ticket.request_id).unwrap();

    tokio::time::advance(Duration::from_secs(300)).await;

    assert_eq!(
        backend.verify_code(&ticket.request_id, &code).await,
        Err(TransportError::Expired)
    );
    assert_eq!(backend.peek_code(&ticket.request_id), None);
}

#[tokio::test]
async fn test_submit_records_enquiry() {
    let backend = MockVerificationTransport::new(300);
    let mut draft = EnquiryDraft::new();
    draft.parent_name = "Sam Lee".to_string();

    let receipt = backend.submit_enquiry(&draft).await.unwrap();
    assert!(receipt.success);

    let stored = backend.enquiries();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].enquiry_id, receipt.enquiry_id);
    assert_eq!(stored[0].draft.parent_name, "Sam Lee");
}

#[tokio::test]
async fn test_simulated_failure() {
    let backend = MockVerificationTransport::with_options(300, 4, true);
    assert!(matches!(
        backend.request_challenge(&phone(), None).await,
        Err(TransportError::Service { .. })
    ));
    assert!(matches!(
        backend.submit_enquiry(&EnquiryDraft::new()).await,
        Err(TransportError::Service { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_expired_codes_are_pruned_on_next_request() {
    let backend = MockVerificationTransport::new(300);
    let first = backend.request_challenge(&phone(), None).await.unwrap();
    let second = backend.request_challenge(&phone(), None).await.unwrap();
    assert_eq!(backend.outstanding(), 2);

    tokio::time::advance(Duration::from_secs(301)).await;
    let third = backend.request_challenge(&phone(), None).await.unwrap();

    assert_eq!(backend.outstanding(), 1);
    assert_eq!(backend.peek_code(&first.request_id), None);
    assert_eq!(backend.peek_code(&second.request_id), None);
    assert!(backend.peek_code(&third.request_id).is_some());
}
