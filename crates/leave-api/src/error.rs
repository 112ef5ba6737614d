//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leave_persistence::PersistenceError;
use leave_telegram::{LinkError, TelegramError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Details are logged, not returned.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed");
        }
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { kind, id } => {
                ApiError::NotFound(format!("{} not found: {}", kind, id))
            }
            PersistenceError::Conflict { kind, id } => {
                ApiError::Conflict(format!("{} already exists: {}", kind, id))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::InvalidEmail(email) => {
                ApiError::BadRequest(format!("invalid email: {}", email))
            }
            LinkError::ProfileNotFound(email) => {
                ApiError::NotFound(format!("no user profile with email {}", email))
            }
            LinkError::Persistence(e) => e.into(),
        }
    }
}

impl From<TelegramError> for ApiError {
    fn from(err: TelegramError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
