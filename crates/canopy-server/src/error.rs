//! Error types for the HTTP server.
//!
//! Every error resolves to one JSON body `{"error": ..., "code": ...}` with
//! a stable machine-readable code, so UI callers can dispatch without
//! parsing messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canopy_engine::EngineError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    /// Request shape is invalid (missing field, unknown tag, malformed id).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Engine operation failed.
    #[error("{0}")]
    Engine(#[from] EngineError),
}

impl ApiError {
    /// Stable machine-readable code.
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Engine(e) => e.code(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Engine(EngineError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Engine(EngineError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Engine(
                EngineError::DuplicationFailed(_)
                | EngineError::CascadeFailed(_)
                | EngineError::Store(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = json!({"error": self.to_string(), "code": self.code()});
        (status, axum::Json(body)).into_response()
    }
}
