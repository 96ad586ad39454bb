//! Common utility functions

pub mod phone;
pub mod validation;

// Re-export commonly used utilities
pub use phone::{
    mask_phone_number, validate_phone, CanonicalPhone, PhoneEntryFormat, PhoneError,
    PhoneValidator,
};
pub use validation::{Validate, ValidationError, ValidationErrors};

/// True iff `code` is exactly `length` decimal digits
pub fn validate_otp_shape(code: &str, length: usize) -> bool {
    validation::validators::is_digits_of_length(code, length)
}
