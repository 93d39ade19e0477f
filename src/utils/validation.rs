use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

pub fn validate<T: Validate>(val: &T) -> Result<(), ValidationErrors> {
    val.validate()
}

pub fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Single-field error for checks the derive attributes can't express.
pub fn field_error(field: &'static str, code: &'static str, message: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message.to_string()));
    errors.add(field, error);
    errors
}
