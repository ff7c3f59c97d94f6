//! Error types for the backend client

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors returned by a `Backend`
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Document, collection or account not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique constraint violated (e.g. account email already registered)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request rejected before reaching the backend
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Any other non-success status
    #[error("backend error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Transport failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// HTTP status that best describes this error to a caller.
    pub fn status_code(&self) -> u16 {
        match self {
            BackendError::Unauthorized(_) => 401,
            BackendError::Forbidden(_) => 403,
            BackendError::NotFound(_) => 404,
            BackendError::Conflict(_) => 409,
            BackendError::Invalid(_) => 400,
            BackendError::Api { status, .. } => *status,
            BackendError::Network(_) => 502,
            BackendError::Json(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

/// The one error type surfaced to users from sign-in, sign-up and sign-out.
///
/// Wraps whatever went wrong in a message fit for display on the login page.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(error: BackendError) -> Self {
        let message = match &error {
            BackendError::Unauthorized(_) => "Invalid email or password.".to_string(),
            BackendError::Conflict(_) => "An account with this email already exists.".to_string(),
            BackendError::Invalid(msg) => msg.clone(),
            BackendError::Forbidden(_) => "You are not allowed to do that.".to_string(),
            BackendError::Network(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            BackendError::NotFound(_) | BackendError::Api { .. } | BackendError::Json(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        };
        AuthError { message }
    }
}
