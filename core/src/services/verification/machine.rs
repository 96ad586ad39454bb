//! Synchronous reducer for the verification session
//!
//! The machine never performs I/O. Each step returns the new state and the
//! commands a host must run; command completions come back through
//! [`SessionMachine::complete`].

use tracing::debug;

use eq_shared::phone::CanonicalPhone;
use eq_shared::validation::ValidationErrors;

use super::config::SessionConfig;
use super::resend::{ResendAvailability, ResendController, ResendOrigin};
use super::types::{Command, CommandOutcome, SessionEvent, SessionSnapshot, SessionState, Transition};
use crate::domain::entities::{EnquiryDraft, EnquirySnapshot, VerificationChallenge};
use crate::domain::value_objects::OtpBuffer;
use crate::errors::{messages, DomainError, DomainResult, SessionError, TransportError};

/// Challenge request in flight and what it is for
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingRequest {
    Initial,
    Resend(ResendOrigin),
}

#[derive(Debug)]
pub struct SessionMachine {
    config: SessionConfig,
    draft: EnquirySnapshot,
    phone: CanonicalPhone,
    state: SessionState,
    buffer: OtpBuffer,
    error: Option<SessionError>,
    notice: Option<String>,
    resend: ResendController,
    pending: Option<PendingRequest>,
    /// Challenge whose code was accepted; consumed on the server
    verified: Option<VerificationChallenge>,
    /// Countdown value when the session last left `AwaitingCode`
    last_remaining: u64,
}

impl SessionMachine {
    /// Validates the draft and creates an idle session for it
    ///
    /// # Returns
    ///
    /// * `Ok(SessionMachine)` - Idle session holding a frozen copy of the draft
    /// * `Err(ValidationErrors)` - Every field rule the draft violates
    pub fn new(draft: EnquiryDraft, config: SessionConfig) -> Result<Self, ValidationErrors> {
        let snapshot = draft.into_snapshot(&config.phone_validator)?;
        Self::from_snapshot(snapshot, config)
    }

    /// Creates an idle session for an already validated draft
    pub fn from_snapshot(draft: EnquirySnapshot, config: SessionConfig) -> Result<Self, ValidationErrors> {
        let phone = match draft.phone() {
            Some(phone) => phone.clone(),
            None => {
                let mut errors = ValidationErrors::new();
                errors.add_error("phone", "Please enter contact number", "required");
                return Err(errors);
            }
        };

        Ok(Self {
            buffer: OtpBuffer::new(config.otp_length),
            resend: ResendController::new(config.resend_policy),
            last_remaining: config.ttl_seconds,
            config,
            draft,
            phone,
            state: SessionState::Idle,
            error: None,
            notice: None,
            pending: None,
            verified: None,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn buffer(&self) -> &OtpBuffer {
        &self.buffer
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn draft(&self) -> &EnquirySnapshot {
        &self.draft
    }

    pub fn phone(&self) -> &CanonicalPhone {
        &self.phone
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A code for this draft has been accepted by the server
    pub fn is_verified(&self) -> bool {
        self.verified.is_some()
    }

    /// A challenge request is in flight
    pub fn is_requesting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let resend = self.resend.availability(&self.state);
        let awaiting = matches!(self.state, SessionState::AwaitingCode { .. });

        SessionSnapshot {
            state: self.state.clone(),
            error: self.error.clone(),
            notice: self.notice.clone(),
            digits: self.buffer.slots().to_vec(),
            focus: self.buffer.focus(),
            can_edit: awaiting,
            can_submit: awaiting && self.buffer.is_complete(),
            can_resend: self.pending.is_none() && resend == ResendAvailability::Available,
            can_retry_submit: self.can_retry_submit(),
            resend_in: match resend {
                ResendAvailability::Unavailable { in_seconds } => in_seconds,
                ResendAvailability::Available => None,
            },
        }
    }

    fn can_retry_submit(&self) -> bool {
        matches!(self.state, SessionState::Failed { .. }) && self.verified.is_some()
    }

    /// Applies a user or timer event
    ///
    /// Rejected events leave the session untouched and return the reason.
    /// A second verify or submit while one is in flight is rejected with
    /// [`DomainError::DoubleSubmitPrevented`].
    pub fn dispatch(&mut self, event: SessionEvent) -> DomainResult<Transition> {
        let event_name = event.name();
        let from = self.state.name();

        let commands = match event {
            SessionEvent::Start => self.on_start()?,
            SessionEvent::Input { index, text } => {
                self.ensure_editable(event_name)?;
                if self.buffer.input(index, &text) {
                    self.clear_messages();
                }
                Vec::new()
            }
            SessionEvent::Backspace { index } => {
                self.ensure_editable(event_name)?;
                if self.buffer.backspace(index) {
                    self.clear_messages();
                }
                Vec::new()
            }
            SessionEvent::Submit => self.on_submit()?,
            SessionEvent::Resend => self.on_resend()?,
            SessionEvent::RetrySubmit => self.on_retry_submit()?,
            SessionEvent::TimerTick { remaining } => {
                if let SessionState::AwaitingCode {
                    seconds_remaining, ..
                } = &mut self.state
                {
                    *seconds_remaining = remaining.min(*seconds_remaining);
                }
                Vec::new()
            }
            SessionEvent::TimerExpired => self.on_timer_expired(),
        };

        Ok(self.transition(from, event_name, commands))
    }

    /// Applies the completion of a command
    pub fn complete(&mut self, outcome: CommandOutcome) -> DomainResult<Transition> {
        let from = self.state.name();
        let outcome_name = outcome_name(&outcome);

        let commands = match (outcome, self.state.clone()) {
            (CommandOutcome::ChallengeIssued { request_id, issued_at }, SessionState::Idle) => {
                let pending = self.take_pending(outcome_name)?;
                let challenge =
                    VerificationChallenge::new(request_id, self.phone.clone(), issued_at, self.config.ttl_seconds);
                self.state = SessionState::AwaitingCode {
                    challenge,
                    seconds_remaining: self.config.ttl_seconds,
                };
                self.last_remaining = self.config.ttl_seconds;
                if matches!(pending, PendingRequest::Resend(_)) {
                    self.notice = Some(messages::CODE_RESENT.to_string());
                }
                vec![Command::StartTimer {
                    seconds: self.config.ttl_seconds,
                }]
            }
            (CommandOutcome::ChallengeFailed(error), SessionState::Idle) => {
                match self.take_pending(outcome_name)? {
                    PendingRequest::Initial => {
                        self.error = Some(SessionError::new(error.clone(), messages::request_failure(&error)));
                        self.state = SessionState::Failed { reason: error };
                        Vec::new()
                    }
                    PendingRequest::Resend(ResendOrigin::Expired(challenge)) => {
                        self.error = Some(SessionError::new(error.clone(), messages::resend_failure(&error)));
                        self.state = SessionState::Expired { challenge };
                        Vec::new()
                    }
                    PendingRequest::Resend(ResendOrigin::Live {
                        challenge,
                        seconds_remaining,
                    }) => {
                        self.error = Some(SessionError::new(error.clone(), messages::resend_failure(&error)));
                        self.state = SessionState::AwaitingCode {
                            challenge,
                            seconds_remaining,
                        };
                        vec![Command::ResumeTimer]
                    }
                }
            }
            (CommandOutcome::Verified, SessionState::Verifying { challenge }) => {
                self.verified = Some(challenge.clone());
                self.state = SessionState::Submitting { challenge };
                vec![Command::SubmitEnquiry]
            }
            (CommandOutcome::VerifyFailed(error), SessionState::Verifying { challenge }) => {
                self.error = Some(SessionError::new(error.clone(), messages::verify_failure(&error)));
                if error == TransportError::Expired {
                    self.state = SessionState::Expired { challenge };
                    Vec::new()
                } else {
                    self.state = SessionState::AwaitingCode {
                        challenge,
                        seconds_remaining: self.last_remaining,
                    };
                    vec![Command::ResumeTimer]
                }
            }
            (CommandOutcome::Submitted { enquiry_id }, SessionState::Submitting { .. }) => {
                self.notice = Some(messages::SUBMITTED.to_string());
                self.state = SessionState::Succeeded { enquiry_id };
                Vec::new()
            }
            (CommandOutcome::SubmitFailed(error), SessionState::Submitting { .. }) => {
                self.error = Some(SessionError::new(error.clone(), messages::submit_failure(&error)));
                self.state = SessionState::Failed { reason: error };
                Vec::new()
            }
            _ => {
                return Err(DomainError::InvalidTransition {
                    state: from,
                    event: outcome_name,
                })
            }
        };

        Ok(self.transition(from, outcome_name, commands))
    }

    fn on_start(&mut self) -> DomainResult<Vec<Command>> {
        if self.pending.is_some() {
            return Err(DomainError::DoubleSubmitPrevented);
        }
        if self.state != SessionState::Idle {
            return Err(self.invalid("start"));
        }

        self.clear_messages();
        self.pending = Some(PendingRequest::Initial);
        Ok(vec![Command::RequestChallenge {
            phone: self.phone.clone(),
        }])
    }

    fn on_submit(&mut self) -> DomainResult<Vec<Command>> {
        if self.state.is_busy() {
            return Err(DomainError::DoubleSubmitPrevented);
        }

        let SessionState::AwaitingCode {
            challenge,
            seconds_remaining,
        } = &self.state
        else {
            return Err(self.invalid("submit"));
        };

        let Some(code) = self.buffer.code() else {
            let expected = self.buffer.len();
            self.notice = None;
            self.error = Some(SessionError::new(
                DomainError::IncompleteCode { expected },
                messages::incomplete_code(expected),
            ));
            return Ok(Vec::new());
        };

        let challenge = challenge.clone();
        self.last_remaining = *seconds_remaining;
        self.clear_messages();

        let request_id = challenge.request_id.clone();
        self.state = SessionState::Verifying { challenge };
        Ok(vec![Command::CancelTimer, Command::VerifyCode { request_id, code }])
    }

    fn on_resend(&mut self) -> DomainResult<Vec<Command>> {
        if self.state.is_busy() || self.pending.is_some() {
            return Err(DomainError::DoubleSubmitPrevented);
        }

        let origin = self.resend.begin(&self.state)?;
        self.buffer.clear();
        self.clear_messages();
        self.pending = Some(PendingRequest::Resend(origin));
        self.state = SessionState::Idle;

        Ok(vec![
            Command::CancelTimer,
            Command::RequestChallenge {
                phone: self.phone.clone(),
            },
        ])
    }

    fn on_retry_submit(&mut self) -> DomainResult<Vec<Command>> {
        if self.state.is_busy() {
            return Err(DomainError::DoubleSubmitPrevented);
        }
        if !self.can_retry_submit() {
            return Err(self.invalid("retry_submit"));
        }

        match self.verified.clone() {
            Some(challenge) => {
                self.clear_messages();
                self.state = SessionState::Submitting { challenge };
                Ok(vec![Command::SubmitEnquiry])
            }
            None => Err(self.invalid("retry_submit")),
        }
    }

    fn on_timer_expired(&mut self) -> Vec<Command> {
        match &self.state {
            SessionState::AwaitingCode { challenge, .. } => {
                self.state = SessionState::Expired {
                    challenge: challenge.clone(),
                };
                self.last_remaining = 0;
                vec![Command::CancelTimer]
            }
            // Stale expiry from a countdown that was already torn down
            _ => Vec::new(),
        }
    }

    fn ensure_editable(&self, event: &'static str) -> DomainResult<()> {
        if matches!(self.state, SessionState::AwaitingCode { .. }) {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn take_pending(&mut self, outcome: &'static str) -> DomainResult<PendingRequest> {
        self.pending.take().ok_or(DomainError::InvalidTransition {
            state: self.state.name(),
            event: outcome,
        })
    }

    fn clear_messages(&mut self) {
        self.error = None;
        self.notice = None;
    }

    fn invalid(&self, event: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            state: self.state.name(),
            event,
        }
    }

    fn transition(&self, from: &'static str, event: &'static str, commands: Vec<Command>) -> Transition {
        let to = self.state.name();
        if from != to {
            debug!(from, to, event, "Session state changed");
        }
        Transition {
            state: self.state.clone(),
            commands,
        }
    }
}

fn outcome_name(outcome: &CommandOutcome) -> &'static str {
    match outcome {
        CommandOutcome::ChallengeIssued { .. } => "challenge_issued",
        CommandOutcome::ChallengeFailed(_) => "challenge_failed",
        CommandOutcome::Verified => "verified",
        CommandOutcome::VerifyFailed(_) => "verify_failed",
        CommandOutcome::Submitted { .. } => "submitted",
        CommandOutcome::SubmitFailed(_) => "submit_failed",
    }
}
