use crate::session::UserType;
use crate::utils::validation::{field_error, is_digits};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub const BRANCH_CODES: [&str; 10] = ["BT", "CH", "CE", "CS", "EE", "EC", "ME", "MT", "SC", "HM"];
pub const YEAR_CHOICES: [&str; 4] = ["I", "II", "III", "IV"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    pub roll_no: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub user_type: UserType,
}

impl SignupRequest {
    /// Field checks the derive can't express: roll number format, branch and
    /// year choice lists, year required for students.
    pub fn validate_choices(&self) -> Result<(), ValidationErrors> {
        if self.roll_no.len() != 6 || !is_digits(&self.roll_no) {
            return Err(field_error(
                "roll_no",
                "roll_no",
                "Roll number must be exactly 6 digits",
            ));
        }
        if !BRANCH_CODES.contains(&self.branch.as_str()) {
            return Err(field_error("branch", "branch", "Unknown branch code"));
        }
        match (&self.user_type, self.year.as_deref()) {
            (UserType::Student, None) | (UserType::Student, Some("")) => Err(field_error(
                "year",
                "year",
                "Year is required for students",
            )),
            (_, Some(year)) if !year.is_empty() && !YEAR_CHOICES.contains(&year) => {
                Err(field_error("year", "year", "Unknown year"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Roll number is required"))]
    pub roll_no: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub is_faculty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Signup,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
    pub purpose: OtpPurpose,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub email: String,
    #[serde(default)]
    pub needs_verification: bool,
}

/// Plain `{"message": ...}` acknowledgements (OTP, password reset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default)]
    pub refresh: Option<String>,
}
