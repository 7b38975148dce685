//! HTTP error responses.
//!
//! Every error leaves the service as `{"error": <message>, "code": <CODE>}`
//! with a status derived from the [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::{AuthError, ErrorCode, ValidationError};
use crate::ports::MessageStoreError;

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code, e.g. `POLICY_VIOLATION`.
    pub code: String,
}

/// API error type that converts domain and port errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PolicyViolation, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::PolicyViolation => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<MessageStoreError> for ApiError {
    fn from(err: MessageStoreError) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => Self::unauthorized("Token expired"),
            AuthError::InvalidToken => Self::unauthorized("Invalid token"),
            AuthError::IdentityMismatch { .. } => Self::policy_violation(err.to_string()),
            AuthError::ServiceUnavailable(msg) => Self::new(
                ErrorCode::InternalError,
                format!("Authentication service unavailable: {}", msg),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(code = %self.code, "Internal error: {}", self.message);
            "An internal error occurred".to_string()
        } else {
            self.message
        };

        let body = ErrorResponse {
            error: message,
            code: self.code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
