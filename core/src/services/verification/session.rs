//! Async driver that runs the session machine against a transport

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info, warn};

use eq_shared::phone::{mask_phone_number, CanonicalPhone};
use eq_shared::validation::ValidationErrors;

use super::config::SessionConfig;
use super::countdown::{CountdownTimer, TimerEvent};
use super::machine::SessionMachine;
use super::traits::VerificationTransport;
use super::types::{Command, CommandOutcome, SessionEvent, SessionSnapshot, SessionState};
use crate::domain::entities::{EnquiryDraft, RequestId};
use crate::errors::{DomainError, DomainResult, TransportError};

impl From<TimerEvent> for SessionEvent {
    fn from(event: TimerEvent) -> Self {
        match event {
            TimerEvent::Tick { remaining } => SessionEvent::TimerTick { remaining },
            TimerEvent::Expired => SessionEvent::TimerExpired,
        }
    }
}

/// Phone verification session for one enquiry draft
///
/// Owns the machine, the countdown and the transport handle. `&mut self`
/// on every transition keeps exactly one transition in flight; a host that
/// shares a session between tasks must put it behind a mutex.
pub struct VerificationSession<T: VerificationTransport + ?Sized> {
    transport: Arc<T>,
    machine: SessionMachine,
    timer: Option<CountdownTimer>,
    timer_events: Option<mpsc::UnboundedReceiver<TimerEvent>>,
    /// Expiry of the current challenge on the local clock
    deadline: Option<Instant>,
    closed: bool,
}

impl<T: VerificationTransport + ?Sized> VerificationSession<T> {
    /// Creates an idle session after validating the draft
    ///
    /// # Arguments
    ///
    /// * `transport` - Backend the three round trips go to
    /// * `draft` - Enquiry to verify and submit
    /// * `config` - TTL, code length and resend policy
    pub fn new(transport: Arc<T>, draft: EnquiryDraft, config: SessionConfig) -> Result<Self, ValidationErrors> {
        let machine = SessionMachine::new(draft, config)?;
        Ok(Self::with_machine(transport, machine))
    }

    pub fn with_machine(transport: Arc<T>, machine: SessionMachine) -> Self {
        Self {
            transport,
            machine,
            timer: None,
            timer_events: None,
            deadline: None,
            closed: false,
        }
    }

    pub fn current_state(&self) -> &SessionState {
        self.machine.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.machine.snapshot()
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    /// A countdown task is attached
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Applies an event and runs every command it produces to completion
    ///
    /// # Returns
    ///
    /// * `Ok(SessionState)` - State after all follow-up round trips finished
    /// * `Err(DomainError)` - The event was rejected; the session is unchanged
    pub async fn dispatch(&mut self, event: SessionEvent) -> DomainResult<SessionState> {
        if self.closed {
            return Err(DomainError::InvalidTransition {
                state: "closed",
                event: event.name(),
            });
        }

        let transition = self.machine.dispatch(event)?;
        self.run(transition.commands).await;
        Ok(self.machine.state().clone())
    }

    /// Waits for the next countdown event
    ///
    /// Pends forever while no countdown is running, so it can sit in a
    /// `select!` next to user input. Cancel safe.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        loop {
            match self.timer_events.as_mut() {
                Some(rx) => match rx.recv().await {
                    Some(event) => return Some(event),
                    None => self.timer_events = None,
                },
                None => return std::future::pending().await,
            }
        }
    }

    /// Tears down the countdown; later events are rejected
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_timer();
        self.closed = true;
        info!(state = self.machine.state().name(), event = "session_closed", "Verification session closed");
    }

    async fn run(&mut self, commands: Vec<Command>) {
        let mut queue: VecDeque<Command> = commands.into();

        while let Some(command) = queue.pop_front() {
            let follow_up = match command {
                Command::RequestChallenge { phone } => {
                    let outcome = self.request_challenge(&phone).await;
                    self.machine.complete(outcome)
                }
                Command::VerifyCode { request_id, code } => {
                    let outcome = self.verify_code(&request_id, &code).await;
                    self.machine.complete(outcome)
                }
                Command::SubmitEnquiry => {
                    let outcome = self.submit_enquiry().await;
                    self.machine.complete(outcome)
                }
                Command::StartTimer { seconds } => {
                    self.start_timer(seconds);
                    continue;
                }
                Command::ResumeTimer => {
                    let event = self.resume_timer();
                    self.machine.dispatch(event)
                }
                Command::CancelTimer => {
                    self.cancel_timer();
                    continue;
                }
            };

            match follow_up {
                Ok(transition) => queue.extend(transition.commands),
                Err(e) => warn!(error = %e, "Command completion rejected by session"),
            }
        }
    }

    async fn request_challenge(&self, phone: &CanonicalPhone) -> CommandOutcome {
        let masked = mask_phone_number(phone.as_str());
        info!(phone = %masked, event = "challenge_requested", "Requesting verification code");

        match self
            .transport
            .request_challenge(phone, Some(self.machine.draft().draft()))
            .await
        {
            Ok(ticket) => {
                info!(
                    phone = %masked,
                    request_id = %ticket.request_id,
                    event = "challenge_issued",
                    "Verification code sent"
                );
                CommandOutcome::ChallengeIssued {
                    request_id: ticket.request_id,
                    issued_at: Utc::now(),
                }
            }
            Err(e) => {
                if let TransportError::InvalidPhone { .. } = e {
                    // Drafts are validated on entry, so a rejected phone is a bug on one side
                    error!(phone = %masked, event = "challenge_phone_rejected", "Phone number rejected by the transport");
                } else {
                    warn!(phone = %masked, kind = %e.kind(), error = %e, event = "challenge_failed", "Failed to request verification code");
                }
                CommandOutcome::ChallengeFailed(e)
            }
        }
    }

    async fn verify_code(&self, request_id: &RequestId, code: &str) -> CommandOutcome {
        info!(request_id = %request_id, event = "code_submitted", "Verifying code");

        match self.transport.verify_code(request_id, code).await {
            Ok(()) => {
                info!(request_id = %request_id, event = "code_verified", "Code verified");
                CommandOutcome::Verified
            }
            Err(e) => {
                warn!(request_id = %request_id, kind = %e.kind(), event = "code_rejected", "Code verification failed");
                CommandOutcome::VerifyFailed(e)
            }
        }
    }

    async fn submit_enquiry(&self) -> CommandOutcome {
        let draft = self.machine.draft();
        let phone = mask_phone_number(self.machine.phone().as_str());

        match self.transport.submit_enquiry(draft.draft()).await {
            Ok(receipt) if receipt.success => {
                info!(phone = %phone, enquiry_id = %receipt.enquiry_id, event = "enquiry_submitted", "Enquiry submitted");
                CommandOutcome::Submitted {
                    enquiry_id: receipt.enquiry_id,
                }
            }
            Ok(_) => {
                warn!(phone = %phone, event = "enquiry_rejected", "Backend did not accept the enquiry");
                CommandOutcome::SubmitFailed(TransportError::service("Enquiry was not accepted"))
            }
            Err(e) => {
                error!(phone = %phone, error = %e, event = "enquiry_submit_failed", "Verified enquiry could not be submitted");
                CommandOutcome::SubmitFailed(e)
            }
        }
    }

    fn start_timer(&mut self, seconds: u64) {
        self.deadline = Some(Instant::now() + Duration::from_secs(seconds));
        self.spawn_countdown(seconds);
    }

    /// Restarts the countdown toward the existing deadline
    fn resume_timer(&mut self) -> SessionEvent {
        let remaining = self
            .deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or_default();
        let seconds = (remaining.as_millis() as u64).div_ceil(1000);

        if seconds == 0 {
            self.cancel_timer();
            return SessionEvent::TimerExpired;
        }

        self.spawn_countdown(seconds);
        SessionEvent::TimerTick { remaining: seconds }
    }

    fn spawn_countdown(&mut self, seconds: u64) {
        self.cancel_timer();
        let (timer, rx) = CountdownTimer::start(seconds);
        self.timer = Some(timer);
        self.timer_events = Some(rx);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        // Dropping the receiver discards ticks queued before the cancel
        self.timer_events = None;
    }
}
