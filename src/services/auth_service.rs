use crate::dto::auth_dto::{
    LoginRequest, LoginResponse, MessageResponse, OtpRequest, PasswordResetRequest,
    ResetPasswordRequest, SignupRequest, SignupResponse, VerifyOtpRequest,
};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, AuthHttp};
use crate::models::user::UserAccount;
use crate::session::UserType;
use crate::utils::validation::validate;
use serde_json::Value;

#[derive(Clone)]
pub struct AuthService {
    http: AuthHttp,
}

impl AuthService {
    pub fn new(http: AuthHttp) -> Self {
        Self { http }
    }

    /// Register a new account. The backend leaves it inactive until the OTP
    /// sent to the given email is verified.
    pub async fn signup(&self, payload: &SignupRequest) -> Result<SignupResponse> {
        validate(payload)?;
        payload.validate_choices()?;
        tracing::info!(roll_no = %payload.roll_no, "registering account");
        self.http.post_public("/auth/signup/", payload).await
    }

    pub async fn generate_otp(&self, email: &str) -> Result<MessageResponse> {
        let payload = OtpRequest {
            email: email.to_string(),
        };
        validate(&payload)?;
        self.http.post_public("/auth/otp/generate/", &payload).await
    }

    pub async fn verify_otp(&self, payload: &VerifyOtpRequest) -> Result<MessageResponse> {
        validate(payload)?;
        self.http.post_public("/auth/verify-otp/", payload).await
    }

    /// Authenticate and establish the session. An inactive account surfaces
    /// as [`Error::AccountNotVerified`] so the caller can route to OTP entry
    /// instead of showing a generic failure.
    pub async fn login(&self, roll_no: &str, password: &str) -> Result<UserType> {
        let payload = LoginRequest {
            roll_no: roll_no.to_string(),
            password: password.to_string(),
        };
        validate(&payload)?;

        let request =
            ApiRequest::post_json("/auth/login/", serde_json::to_value(&payload)?).public();
        let response = self.http.send_raw(request).await?;

        if !response.is_success() {
            if let Ok(body) = response.json::<Value>() {
                if body
                    .get("needs_verification")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
                {
                    return Err(Error::AccountNotVerified {
                        email: body
                            .get("email")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    });
                }
            }
            return Err(Error::from_response(response.status, &response.body));
        }

        let tokens: LoginResponse = response.json()?;
        let user_type = if tokens.is_faculty {
            UserType::Faculty
        } else {
            UserType::Student
        };
        self.http
            .guard()
            .establish(&tokens.access, &tokens.refresh, user_type)?;
        Ok(user_type)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse> {
        let payload = PasswordResetRequest {
            email: email.to_string(),
        };
        validate(&payload)?;
        self.http
            .post_public("/auth/request-password-reset/", &payload)
            .await
    }

    pub async fn reset_password(&self, payload: &ResetPasswordRequest) -> Result<MessageResponse> {
        validate(payload)?;
        self.http.post_public("/auth/reset-password/", payload).await
    }

    pub async fn student_details(&self) -> Result<UserAccount> {
        self.http.get_json("/auth/student/details/").await
    }

    pub async fn faculty_details(&self) -> Result<UserAccount> {
        self.http.get_json("/auth/faculty/details/").await
    }

    /// All registered students; faculty use this for assignment overviews.
    pub async fn all_students(&self) -> Result<Vec<UserAccount>> {
        self.http.get_json("/auth/students/").await
    }

    /// Drop the local session. Purely client-side; the backend keeps no
    /// session state beyond the tokens themselves.
    pub fn logout(&self) -> Result<()> {
        self.http.guard().logout()
    }
}
