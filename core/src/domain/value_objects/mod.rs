//! Value objects representing immutable domain concepts.

pub mod otp_buffer;

// Re-export commonly used types
pub use otp_buffer::OtpBuffer;
