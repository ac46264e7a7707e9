//! Error responses for the HTTP surface.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// JSON error body: `{"error": "...", "code": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// A `DomainError` on its way to the client.
///
/// Unexpected errors (storage, internal) are logged in full; the client only
/// sees their message when `expose_internal` is set.
#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    expose_internal: bool,
}

impl ApiError {
    pub fn new(error: DomainError, expose_internal: bool) -> Self {
        Self {
            error,
            expose_internal,
        }
    }

    /// A malformed or unparseable request body.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        Self::new(
            DomainError::new(ErrorCode::ValidationFailed, rejection.body_text()),
            false,
        )
    }

    pub fn code(&self) -> ErrorCode {
        self.error.code
    }
}

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ProgressNotFound | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed
        | ErrorCode::HintLimitReached
        | ErrorCode::InvalidStateTransition => StatusCode::BAD_REQUEST,
        ErrorCode::ConflictDuplicate | ErrorCode::ConcurrentModification => StatusCode::CONFLICT,
        ErrorCode::TransactionTimeout => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.error.code);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = %self.error.code, error = %self.error.message, "Unexpected error");
            if self.expose_internal {
                self.error.message.clone()
            } else {
                GENERIC_MESSAGE.to_string()
            }
        } else {
            self.error.message.clone()
        };

        let body = ErrorResponse::new(self.error.code.to_string(), message);
        (status, Json(body)).into_response()
    }
}
