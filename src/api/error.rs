//! Error types for web handlers.
//!
//! Bridges the domain [`Error`] to HTTP responses. Every failure is rendered as
//! an [`ErrorBody`] so clients can tell "no state change" rejections from
//! transport trouble.

use crate::{
    errors::Error,
    models::{ErrorBody, Failure},
};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Domain error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            Error::AmbiguousProduct { .. }
            | Error::InsufficientStock { .. }
            | Error::DuplicateInvoice { .. } => StatusCode::CONFLICT,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Config { .. } | Error::Transport { .. } | Error::Database(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(Error::validation(value.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = Failure::from(&self.0);

        // Internal causes are logged, never sent
        let message = if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Internal server error");
            "An internal error occurred".to_string()
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
            self.0.to_string()
        };

        let body = ErrorBody {
            error: message,
            detail,
        };
        (status, Json(body)).into_response()
    }
}
