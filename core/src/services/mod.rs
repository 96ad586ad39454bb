//! Business services containing domain logic and use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    format_countdown, ChallengeTicket, Command, CommandOutcome, CountdownTimer, ResendAvailability,
    ResendController, SessionConfig, SessionEvent, SessionMachine, SessionSnapshot, SessionState,
    SubmitReceipt, TimerEvent, Transition, VerificationSession, VerificationTransport,
};
