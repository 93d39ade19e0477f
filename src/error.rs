use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("Account is not active. Please verify your email with OTP.")]
    AccountNotVerified { email: Option<String> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    /// Build an `Api` error from a response status and raw body, picking the
    /// backend's `{"error": ...}` / `{"detail": ...}` message when present.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Error::Api {
            status,
            message: extract_message(body)
                .unwrap_or_else(|| "An unexpected error occurred".to_string()),
        }
    }

    /// True when the caller should re-authenticate rather than retry.
    pub fn requires_login(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }
}

fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    for key in ["error", "detail", "message"] {
        if let Some(msg) = value.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_backend_message() {
        let err = Error::from_response(404, br#"{"error":"Quiz not found"}"#);
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Quiz not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_on_opaque_body() {
        let err = Error::from_response(502, b"<html>Bad Gateway</html>");
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "An unexpected error occurred");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
