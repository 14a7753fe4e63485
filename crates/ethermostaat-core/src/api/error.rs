use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authorized - username or password rejected")]
    NotAuthorized,

    #[error("Unauthorized - session token rejected")]
    Unauthorized,

    #[error("Login rejected with status code {0}")]
    LoginRejected(i64),

    #[error("ICY E-Thermostaat Webservice Offline.")]
    ServiceUnavailable,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid temperature: {0}")]
    InvalidTemperature(f64),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the remote side refused the credentials or token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::NotAuthorized | ApiError::Unauthorized)
    }
}
