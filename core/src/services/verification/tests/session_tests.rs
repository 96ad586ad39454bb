//! Async session driver tests against the scripted transport

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::RequestId;
use crate::errors::{messages, DomainError, TransportError};
use crate::services::verification::{
    ChallengeTicket, SessionEvent, SessionState, SubmitReceipt, TimerEvent, VerificationSession,
};

use super::mocks::{test_config, valid_draft, MockTransport, TransportCall};

async fn started(transport: Arc<MockTransport>) -> VerificationSession<MockTransport> {
    let mut session = VerificationSession::new(transport, valid_draft(), test_config()).unwrap();
    let state = session.dispatch(SessionEvent::Start).await.unwrap();
    assert!(matches!(state, SessionState::AwaitingCode { .. }));
    session
}

async fn enter_code(session: &mut VerificationSession<MockTransport>, code: &str) {
    session
        .dispatch(SessionEvent::Input {
            index: 0,
            text: code.to_string(),
        })
        .await
        .unwrap();
}

/// Feeds countdown events into the session until it expires
async fn run_until_expired(session: &mut VerificationSession<MockTransport>) -> usize {
    let mut ticks = 0;
    loop {
        let event = session.next_timer_event().await.unwrap();
        session.dispatch(event.into()).await.unwrap();
        match event {
            TimerEvent::Tick { .. } => ticks += 1,
            TimerEvent::Expired => return ticks,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_sends_canonical_phone_with_form() {
    let transport = Arc::new(MockTransport::new(false));
    let session = started(transport.clone()).await;

    assert_eq!(
        transport.calls(),
        vec![TransportCall::Request {
            phone: "+14155552671".to_string(),
            with_form: true,
        }]
    );
    assert!(session.has_timer());
    match session.current_state() {
        SessionState::AwaitingCode {
            challenge,
            seconds_remaining,
        } => {
            assert_eq!(challenge.request_id.as_str(), "r-1");
            assert_eq!(*seconds_remaining, 300);
        }
        other => panic!("Expected AwaitingCode, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_happy_path_verifies_then_submits() {
    let transport = Arc::new(MockTransport::new(false));
    transport.push_submit(Ok(SubmitReceipt {
        success: true,
        enquiry_id: "enq-42".to_string(),
    }));
    let mut session = started(transport.clone()).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();

    assert_eq!(
        state,
        SessionState::Succeeded {
            enquiry_id: "enq-42".to_string()
        }
    );
    assert!(!session.has_timer());
    assert_eq!(
        transport.calls()[1..],
        [
            TransportCall::Verify {
                request_id: "r-1".to_string(),
                code: "4821".to_string(),
            },
            TransportCall::Submit {
                parent_name: "Sam Lee".to_string(),
            },
        ]
    );
    assert_eq!(session.snapshot().notice.as_deref(), Some(messages::SUBMITTED));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_code_returns_to_awaiting_and_resumes_timer() {
    let transport = Arc::new(MockTransport::new(false));
    transport.push_verify(Err(TransportError::InvalidCode));
    let mut session = started(transport.clone()).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();

    match state {
        SessionState::AwaitingCode { challenge, .. } => assert_eq!(challenge.request_id, RequestId::new("r-1")),
        other => panic!("Expected AwaitingCode, got {:?}", other),
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.error.unwrap().message, "Invalid code. Please check and try again.");
    assert_eq!(snapshot.digits, vec![Some('4'), Some('8'), Some('2'), Some('1')]);
    assert!(session.has_timer());
    assert_eq!(transport.submit_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timer_reaching_zero_expires_session() {
    let transport = Arc::new(MockTransport::new(false));
    let mut session = started(transport).await;

    let ticks = run_until_expired(&mut session).await;

    assert_eq!(ticks, 299);
    assert!(matches!(session.current_state(), SessionState::Expired { .. }));
    let snapshot = session.snapshot();
    assert!(snapshot.can_resend);
    assert!(!snapshot.can_submit);
    assert!(!session.has_timer());
}

#[tokio::test(start_paused = true)]
async fn test_resend_after_expiry_issues_new_challenge_and_restarts_timer() {
    let transport = Arc::new(MockTransport::new(false));
    let mut session = started(transport.clone()).await;
    enter_code(&mut session, "12").await;
    run_until_expired(&mut session).await;

    let state = session.dispatch(SessionEvent::Resend).await.unwrap();

    match state {
        SessionState::AwaitingCode {
            challenge,
            seconds_remaining,
        } => {
            assert_eq!(challenge.request_id.as_str(), "r-2");
            assert_eq!(seconds_remaining, 300);
        }
        other => panic!("Expected AwaitingCode, got {:?}", other),
    }
    let snapshot = session.snapshot();
    assert!(snapshot.digits.iter().all(Option::is_none));
    assert_eq!(snapshot.focus, 0);
    assert_eq!(snapshot.notice.as_deref(), Some(messages::CODE_RESENT));

    assert_eq!(
        session.next_timer_event().await,
        Some(TimerEvent::Tick { remaining: 299 })
    );
}

#[tokio::test(start_paused = true)]
async fn test_resend_failure_stays_expired() {
    let transport = Arc::new(MockTransport::new(false));
    let mut session = started(transport.clone()).await;
    run_until_expired(&mut session).await;

    transport.push_request(Err(TransportError::service("")));
    let state = session.dispatch(SessionEvent::Resend).await.unwrap();

    match state {
        SessionState::Expired { challenge } => assert_eq!(challenge.request_id.as_str(), "r-1"),
        other => panic!("Expected Expired, got {:?}", other),
    }
    assert_eq!(
        session.snapshot().error.map(|e| e.message),
        Some(messages::RESEND_FAILED.to_string())
    );

    // The user may try again
    let state = session.dispatch(SessionEvent::Resend).await.unwrap();
    assert!(matches!(state, SessionState::AwaitingCode { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_resend_refused_while_code_is_live() {
    let transport = Arc::new(MockTransport::new(false));
    let mut session = started(transport.clone()).await;

    let result = session.dispatch(SessionEvent::Resend).await;
    assert!(matches!(result, Err(DomainError::ResendUnavailable { .. })));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_after_verify_is_retryable_without_reverify() {
    let transport = Arc::new(MockTransport::new(false));
    transport.push_submit(Err(TransportError::service("Bad gateway")));
    let mut session = started(transport.clone()).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();

    assert_eq!(
        state,
        SessionState::Failed {
            reason: TransportError::service("Bad gateway")
        }
    );
    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.error.map(|e| e.message),
        Some(messages::SUBMIT_FAILED.to_string())
    );
    assert!(snapshot.digits.iter().all(Option::is_some));
    assert!(snapshot.can_retry_submit);
    assert_eq!(session.machine().draft().parent_name, "Sam Lee");

    let state = session.dispatch(SessionEvent::RetrySubmit).await.unwrap();
    assert!(matches!(state, SessionState::Succeeded { .. }));
    assert_eq!(transport.verify_count(), 1);
    assert_eq!(transport.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unsuccessful_receipt_is_a_submit_failure() {
    let transport = Arc::new(MockTransport::new(false));
    transport.push_submit(Ok(SubmitReceipt {
        success: false,
        enquiry_id: String::new(),
    }));
    let mut session = started(transport).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();
    assert!(matches!(state, SessionState::Failed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_slow_verify_past_deadline_lands_in_expired() {
    let transport = Arc::new(MockTransport::new(false).with_verify_delay(Duration::from_secs(400)));
    transport.push_verify(Err(TransportError::InvalidCode));
    let mut session = started(transport.clone()).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();

    assert!(matches!(state, SessionState::Expired { .. }));
    assert!(!session.has_timer());
    assert!(session.snapshot().can_resend);
}

#[tokio::test(start_paused = true)]
async fn test_slow_verify_success_still_submits() {
    let transport = Arc::new(MockTransport::new(false).with_verify_delay(Duration::from_secs(400)));
    let mut session = started(transport.clone()).await;

    enter_code(&mut session, "4821").await;
    let state = session.dispatch(SessionEvent::Submit).await.unwrap();

    assert!(matches!(state, SessionState::Succeeded { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_initial_request_failure() {
    let transport = Arc::new(MockTransport::new(true));
    let mut session = VerificationSession::new(transport.clone(), valid_draft(), test_config()).unwrap();

    let state = session.dispatch(SessionEvent::Start).await.unwrap();

    assert!(matches!(
        state,
        SessionState::Failed {
            reason: TransportError::Service { .. }
        }
    ));
    assert!(!session.has_timer());
    assert_eq!(
        session.snapshot().error.map(|e| e.message),
        Some("Internal server error".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_first_request_uses_scripted_ticket() {
    let transport = Arc::new(MockTransport::new(false));
    transport.push_request(Ok(ChallengeTicket {
        request_id: RequestId::new("abc-123"),
    }));
    let session = started(transport).await;

    assert_eq!(
        session.current_state().challenge().map(|c| c.request_id.as_str()),
        Some("abc-123")
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_tears_down_timer_and_rejects_events() {
    let transport = Arc::new(MockTransport::new(false));
    let mut session = started(transport).await;
    assert!(session.has_timer());

    session.close();

    assert!(!session.has_timer());
    assert!(session.is_closed());
    assert!(matches!(
        session.dispatch(SessionEvent::Submit).await,
        Err(DomainError::InvalidTransition { .. })
    ));
}
