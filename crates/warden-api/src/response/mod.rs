//! Response types and error handling for API endpoints
//!
//! Every error renders as `{code, message, details?}`. Server errors are
//! logged with their cause and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;
use warden_common::{AppError, ErrorResponse};
use warden_service::ServiceError;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing authorization header")]
    MissingAuth,
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Validation(_) | Self::InvalidBody(_) => 400,
            Self::MissingAuth => 401,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Validation(_) | Self::InvalidBody(_) => "VALIDATION_ERROR",
            Self::MissingAuth => "MISSING_AUTH",
        }
    }

    /// Create an invalid body error
    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }

    fn into_body(self) -> ErrorResponse {
        match self {
            Self::App(e) => ErrorResponse::from(&e),
            Self::Service(e) => ErrorResponse::from(AppError::from(e)),
            Self::Validation(errors) => ErrorResponse {
                code: "VALIDATION_ERROR".to_string(),
                message: "Validation failed".to_string(),
                details: serde_json::to_value(&errors).ok(),
            },
            other => ErrorResponse {
                code: other.error_code().to_string(),
                message: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log server errors; the body never carries their cause
        if status.is_server_error() {
            error!(error = ?self, status = status.as_u16(), "Server error occurred");
        }

        (status, Json(self.into_body())).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
