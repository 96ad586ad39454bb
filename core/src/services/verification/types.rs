//! Types exchanged between the session, its host and the transport

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eq_shared::phone::CanonicalPhone;

use crate::domain::entities::{RequestId, VerificationChallenge};
use crate::errors::{SessionError, TransportError};

/// Successful `requestChallenge` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTicket {
    pub request_id: RequestId,
}

/// Successful `submitEnquiry` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub success: bool,
    pub enquiry_id: String,
}

/// Where a session stands; exactly one challenge is current at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No live challenge; a request may be in flight
    Idle,
    /// Code sent and the countdown is running
    AwaitingCode {
        challenge: VerificationChallenge,
        seconds_remaining: u64,
    },
    /// `verifyCode` in flight
    Verifying { challenge: VerificationChallenge },
    /// Verified; `submitEnquiry` in flight
    Submitting { challenge: VerificationChallenge },
    /// Enquiry stored
    Succeeded { enquiry_id: String },
    /// Terminal failure for this draft
    Failed { reason: TransportError },
    /// The current code's TTL ran out
    Expired { challenge: VerificationChallenge },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingCode { .. } => "awaiting_code",
            SessionState::Verifying { .. } => "verifying",
            SessionState::Submitting { .. } => "submitting",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
            SessionState::Expired { .. } => "expired",
        }
    }

    /// The current challenge, if one is live or just expired
    pub fn challenge(&self) -> Option<&VerificationChallenge> {
        match self {
            SessionState::AwaitingCode { challenge, .. }
            | SessionState::Verifying { challenge }
            | SessionState::Submitting { challenge }
            | SessionState::Expired { challenge } => Some(challenge),
            _ => None,
        }
    }

    /// A network round trip is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Verifying { .. } | SessionState::Submitting { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Succeeded { .. } | SessionState::Failed { .. })
    }
}

/// Input from the user or the countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Request the first code
    Start,
    /// Text typed or pasted into the box at `index`
    Input { index: usize, text: String },
    /// Backspace on the box at `index`
    Backspace { index: usize },
    /// Submit the entered code
    Submit,
    /// Ask for a replacement code
    Resend,
    /// Retry the enquiry submission after a verified code
    RetrySubmit,
    TimerTick { remaining: u64 },
    TimerExpired,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Start => "start",
            SessionEvent::Input { .. } => "input",
            SessionEvent::Backspace { .. } => "backspace",
            SessionEvent::Submit => "submit",
            SessionEvent::Resend => "resend",
            SessionEvent::RetrySubmit => "retry_submit",
            SessionEvent::TimerTick { .. } => "timer_tick",
            SessionEvent::TimerExpired => "timer_expired",
        }
    }
}

/// Side effect the host must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestChallenge { phone: CanonicalPhone },
    VerifyCode { request_id: RequestId, code: String },
    SubmitEnquiry,
    /// Start a fresh countdown
    StartTimer { seconds: u64 },
    /// Continue the countdown of the current challenge from where its deadline stands
    ResumeTimer,
    CancelTimer,
}

/// Completion of a command, fed back into the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ChallengeIssued {
        request_id: RequestId,
        issued_at: DateTime<Utc>,
    },
    ChallengeFailed(TransportError),
    Verified,
    VerifyFailed(TransportError),
    Submitted { enquiry_id: String },
    SubmitFailed(TransportError),
}

/// Result of one reducer step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub commands: Vec<Command>,
}

/// Everything a host needs to render the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub error: Option<SessionError>,
    pub notice: Option<String>,
    pub digits: Vec<Option<char>>,
    pub focus: usize,
    pub can_edit: bool,
    pub can_submit: bool,
    pub can_resend: bool,
    pub can_retry_submit: bool,
    /// Seconds until resend opens up, when the policy says it will
    pub resend_in: Option<u64>,
}
