//! HTTP transport for the verification backend

pub mod classify;
pub mod dto;
mod transport;

pub use transport::{HttpVerificationTransport, API_KEY_HEADER};
