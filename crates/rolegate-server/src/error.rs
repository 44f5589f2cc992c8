//! HTTP error types for the `rolegate` server.
//!
//! Maps bootstrap errors onto the four statuses the endpoint can return.
//! Bodies are fixed strings so nothing about the caller, the store, or the
//! identity provider leaks to the client. Detail goes to the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegate_core::BootstrapError;
use serde::Serialize;

/// Error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No usable bearer credential.
    #[error("unauthorized")]
    Unauthorized,

    /// The request body did not name a target subject.
    #[error("missing user_id")]
    BadRequest,

    /// The caller may not make this grant.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Store or identity provider failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            Self::BadRequest => (StatusCode::BAD_REQUEST, "Missing user_id"),
            Self::Forbidden(reason) => {
                tracing::debug!(%reason, "request forbidden");
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        (status, axum::Json(ErrorBody { error })).into_response()
    }
}

impl From<BootstrapError> for AppError {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::Unauthorized => Self::Unauthorized,
            BootstrapError::MissingUserId => Self::BadRequest,
            BootstrapError::Forbidden { reason } => Self::Forbidden(reason),
            BootstrapError::Identity(_) | BootstrapError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
