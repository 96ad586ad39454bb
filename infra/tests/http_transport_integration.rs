//! HTTP transport against an in-process axum backend

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use eq_core::{
    EnquiryDraft, Program, RequestId, SessionConfig, SessionEvent, SessionState, TransportError,
    VerificationSession, VerificationTransport,
};
use eq_infra::http::API_KEY_HEADER;
use eq_infra::HttpVerificationTransport;
use eq_shared::phone::CanonicalPhone;
use eq_shared::ApiClientConfig;

const GOOD_CODE: &str = "2468";

#[derive(Default)]
struct Recorded {
    api_keys: Vec<Option<String>>,
    requests: Vec<Value>,
    verifies: Vec<Value>,
    submits: Vec<Value>,
    fail_submit: bool,
}

type Shared = Arc<Mutex<Recorded>>;

fn record_key(state: &Shared, headers: &HeaderMap) {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().api_keys.push(key);
}

async fn request_handler(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_key(&state, &headers);
    let phone = body["phone"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().requests.push(body);

    if phone == "+19999999999" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Phone rejected", "code": "INVALID_PHONE" })),
        )
            .into_response();
    }
    Json(json!({ "requestId": "req-1" })).into_response()
}

async fn verify_handler(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_key(&state, &headers);
    let otp = body["otp"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().verifies.push(body);

    match otp.as_str() {
        GOOD_CODE => Json(json!({ "ok": true })).into_response(),
        // Legacy deployment: text only
        "0000" => (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid OTP code" }))).into_response(),
        // Structured code contradicting the text
        "1111" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request", "code": "OTP_EXPIRED" })),
        )
            .into_response(),
        "5555" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
            .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "OTP not found or already used" })),
        )
            .into_response(),
    }
}

async fn submit_handler(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_key(&state, &headers);
    let mut recorded = state.lock().unwrap();
    recorded.submits.push(body);
    if recorded.fail_submit {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Database unavailable" })),
        )
            .into_response();
    }
    Json(json!({ "success": true, "enquiryId": "enq-42" })).into_response()
}

async fn spawn_backend(state: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/v1/request", post(request_handler))
        .route("/v1/verify", post(verify_handler))
        .route("/v1/submit", post(submit_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn transport_for(state: Shared) -> HttpVerificationTransport {
    let addr = spawn_backend(state).await;
    let config = ApiClientConfig::new(format!("http://{}/v1", addr)).with_api_key("secret-key");
    HttpVerificationTransport::new(&config, 4).unwrap()
}

fn draft() -> EnquiryDraft {
    let mut draft = EnquiryDraft::new();
    draft.update_child(1, |c| {
        c.name = "Mia".to_string();
        c.age = "9".to_string();
        c.selected_course = Some(Program::Ucmas);
    });
    draft.parent_name = "Robin Park".to_string();
    draft.contact_number = "415-555-2671".to_string();
    draft.email = Some("robin@example.com".to_string());
    draft.consent = true;
    draft
}

fn phone() -> CanonicalPhone {
    CanonicalPhone::parse("+14155552671").unwrap()
}

#[tokio::test]
async fn test_full_session_over_http() {
    let state = Shared::default();
    let transport = Arc::new(transport_for(state.clone()).await);
    let mut session = VerificationSession::new(transport, draft(), SessionConfig::default()).unwrap();

    let started = session.dispatch(SessionEvent::Start).await.unwrap();
    assert!(matches!(started, SessionState::AwaitingCode { .. }));

    session
        .dispatch(SessionEvent::Input {
            index: 0,
            text: "0000".to_string(),
        })
        .await
        .unwrap();
    let state_after_wrong = session.dispatch(SessionEvent::Submit).await.unwrap();
    assert!(matches!(state_after_wrong, SessionState::AwaitingCode { .. }));
    assert_eq!(
        session.snapshot().error.map(|e| e.message),
        Some(eq_core::messages::INVALID_CODE.to_string())
    );

    session
        .dispatch(SessionEvent::Input {
            index: 0,
            text: GOOD_CODE.to_string(),
        })
        .await
        .unwrap();
    let finished = session.dispatch(SessionEvent::Submit).await.unwrap();
    assert_eq!(
        finished,
        SessionState::Succeeded {
            enquiry_id: "enq-42".to_string()
        }
    );
    session.close();

    let recorded = state.lock().unwrap();
    assert!(recorded
        .api_keys
        .iter()
        .all(|key| key.as_deref() == Some("secret-key")));

    assert_eq!(recorded.requests.len(), 1);
    assert_eq!(recorded.requests[0]["phone"], "+14155552671");
    assert_eq!(recorded.requests[0]["formData"]["parentName"], "Robin Park");

    assert_eq!(recorded.verifies.len(), 2);
    assert_eq!(recorded.verifies[1]["requestId"], "req-1");
    assert_eq!(recorded.verifies[1]["otp"], GOOD_CODE);

    assert_eq!(recorded.submits.len(), 1);
    assert_eq!(recorded.submits[0]["phone"], "+14155552671");
    assert_eq!(recorded.submits[0]["children"][0]["selectedCourse"], "ucmas");
}

#[tokio::test]
async fn test_verify_error_classification() {
    let transport = transport_for(Shared::default()).await;
    let request_id = RequestId::new("req-1");

    assert_eq!(
        transport.verify_code(&request_id, "0000").await,
        Err(TransportError::InvalidCode)
    );
    assert_eq!(
        transport.verify_code(&request_id, "1111").await,
        Err(TransportError::Expired)
    );
    assert_eq!(
        transport.verify_code(&request_id, "9876").await,
        Err(TransportError::NotFound)
    );
    assert_eq!(
        transport.verify_code(&request_id, "5555").await,
        Err(TransportError::service("Internal server error"))
    );
    assert_eq!(transport.verify_code(&request_id, GOOD_CODE).await, Ok(()));
}

#[tokio::test]
async fn test_request_invalid_phone_code_is_masked() {
    let transport = transport_for(Shared::default()).await;
    let rejected = CanonicalPhone::parse("+19999999999").unwrap();

    match transport.request_challenge(&rejected, None).await {
        Err(TransportError::InvalidPhone { phone }) => assert!(!phone.contains("9999999999")),
        other => panic!("expected InvalidPhone, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_without_form_omits_form_data() {
    let state = Shared::default();
    let transport = transport_for(state.clone()).await;

    let ticket = transport.request_challenge(&phone(), None).await.unwrap();
    assert_eq!(ticket.request_id.as_str(), "req-1");
    assert!(state.lock().unwrap().requests[0].get("formData").is_none());
}

#[tokio::test]
async fn test_failed_submit_is_a_service_error() {
    let state = Shared::default();
    state.lock().unwrap().fail_submit = true;
    let transport = transport_for(state).await;

    let mut submitted = draft();
    submitted.phone = Some(phone());
    assert_eq!(
        transport.submit_enquiry(&submitted).await,
        Err(TransportError::service("Database unavailable"))
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_a_service_error() {
    // Reserve a port, then close it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiClientConfig::new(format!("http://{}", addr));
    let transport = Arc::new(HttpVerificationTransport::new(&config, 4).unwrap());

    assert!(matches!(
        transport.request_challenge(&phone(), None).await,
        Err(TransportError::Service { .. })
    ));

    let mut session = VerificationSession::new(transport, draft(), SessionConfig::default()).unwrap();
    let state = session.dispatch(SessionEvent::Start).await.unwrap();
    assert!(matches!(state, SessionState::Failed { .. }));
    assert!(!session.snapshot().can_retry_submit);
}
