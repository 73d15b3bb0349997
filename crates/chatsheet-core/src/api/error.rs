use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Stored token cannot be sent as an Authorization header")]
    InvalidCredential,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body returned by the backend: `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

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

    /// Pull the server's message out of an error body.
    /// Falls back to the raw body, then to the status reason.
    fn message_from_body(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return Self::truncate_body(&parsed.error);
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            Self::truncate_body(trimmed)
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::message_from_body(status, body);
        match status.as_u16() {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            408 => ApiError::Timeout(message),
            500..=599 => ApiError::ServerError {
                status: status.as_u16(),
                message,
            },
            code => ApiError::UnexpectedStatus {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind this error, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        let code = match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::AccessDenied(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Timeout(_) => 408,
            ApiError::ServerError { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                *status
            }
            ApiError::NetworkError(e) => return e.status(),
            ApiError::InvalidResponse(_) | ApiError::InvalidCredential => return None,
        };
        StatusCode::from_u16(code).ok()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}
