//! Phone verification session module
//!
//! This module provides the client side of the verification protocol:
//! - Transport trait for the request / verify / submit round trips
//! - Countdown timer for the code's lifetime
//! - Resend gating
//! - Session reducer and the async driver that runs it

mod config;
mod countdown;
mod machine;
mod resend;
mod session;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::SessionConfig;
pub use countdown::{format_countdown, CountdownTimer, TimerEvent};
pub use machine::SessionMachine;
pub use resend::{ResendAvailability, ResendController, ResendOrigin};
pub use session::VerificationSession;
pub use traits::VerificationTransport;
pub use types::{
    ChallengeTicket, Command, CommandOutcome, SessionEvent, SessionSnapshot, SessionState, SubmitReceipt,
    Transition,
};
