//! Terminal host for the phone-verified enquiry flow
//!
//! The binary loads a draft and configuration, picks a transport and hands
//! stdin and stdout to [`host::run_session`].

pub mod commands;
pub mod draft;
pub mod host;
pub mod render;
pub mod telemetry;

pub use host::{run_session, HostOutcome};
