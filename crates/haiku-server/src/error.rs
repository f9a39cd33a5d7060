//! API error types with JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use haiku_core::IdError;
use haiku_store::StoreError;
use serde::Serialize;

use crate::extract::DecodeError;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Conflict (409).
    #[error("{0}")]
    Conflict(String),

    /// Payload too large (413).
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unsupported media type (415).
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Service unavailable (503).
    #[error("{0}")]
    Unavailable(String),

    /// Internal server error (500).
    #[error("{0}")]
    Internal(String),

    /// Store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(e) => match e {
                StoreError::UserNotFound(_) | StoreError::NoteNotFound(_) => "NOT_FOUND",
                StoreError::Conflict(_) => "CONFLICT",
                StoreError::InvalidArgument(_) => "BAD_REQUEST",
                StoreError::Connection(_) => "UNAVAILABLE",
                _ => "STORAGE_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::UserNotFound(_) | StoreError::NoteNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                StoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message safe to return to the client.
    ///
    /// Database failures are reported generically; the cause is logged.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(e) => match e {
                StoreError::UserNotFound(_) => "user not found".to_string(),
                StoreError::NoteNotFound(_) => "note not found".to_string(),
                StoreError::Conflict(_) => "resource already exists".to_string(),
                StoreError::InvalidArgument(_) => e.to_string(),
                StoreError::Connection(_) => "database temporarily unavailable".to_string(),
                _ => "storage error".to_string(),
            },
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedMediaType(msg) => Self::UnsupportedMediaType(msg),
            DecodeError::PayloadTooLarge(msg) => Self::PayloadTooLarge(msg),
            DecodeError::BadRequest(msg) => Self::BadRequest(msg),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::Entropy(cause) => Self::Internal(format!("could not generate id: {}", cause)),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message: self.public_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
