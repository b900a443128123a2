//! API error taxonomy and its HTTP mapping.
//!
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl turns each
//! variant into the matching status code with an `{"error": ...}` body.
//! Store failures collapse into `Internal` — the detail is logged, the caller
//! only sees a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed validation (bad field, duplicate username, ...).
    #[error("{0}")]
    Validation(String),

    /// Missing or unknown auth token.
    #[error("Invalid or missing auth token")]
    Unauthorized,

    /// The action is disallowed on this resource (e.g. private dream).
    #[error("{0}")]
    Forbidden(&'static str),

    /// The resource does not exist (or is not visible to the caller).
    #[error("{0}")]
    NotFound(&'static str),

    /// Store or other internal failure. Never surfaced verbatim.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).to_string()),
            ApiError::Internal(e) => {
                error!(err = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
