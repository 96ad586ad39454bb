//! # Enquiry Core
//!
//! Domain layer for the enquiry client: the enquiry draft, verification
//! challenges, the code entry buffer, the error taxonomy and the phone
//! verification session that gates submission.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
