//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! `HttpError` for request handlers.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytegurukul_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Message returned for failures whose details stay in the server log.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error. Please try again later.";

/// Maximum size of an uploaded question paper.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors a request handler can end with. Each maps to a status code and is sent
/// as `{ "success": false, "message": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Only PDF files are allowed!")]
    UnsupportedMediaType,
    #[error("File too large. The maximum size is 10 MB.")]
    PayloadTooLarge,
    #[error("{0}")]
    Server(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Validation(_)
            | HttpError::UnsupportedMediaType
            | HttpError::PayloadTooLarge => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs the underlying failure and hides it behind a generic message.
    pub fn server(context: &str, err: impl std::fmt::Debug) -> Self {
        error!("{}: {:?}", context, err);
        HttpError::Server(SERVER_ERROR_MESSAGE.to_string())
    }
}

impl From<PortError> for HttpError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(message) => HttpError::NotFound(message),
            PortError::Conflict(message) => HttpError::Validation(message),
            PortError::Unexpected(_) => HttpError::server("Persistence failure", err),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "message": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_expected_status_codes() {
        assert_eq!(
            HttpError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HttpError::UnsupportedMediaType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::PayloadTooLarge.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HttpError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(HttpError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unexpected_port_errors_do_not_leak_details() {
        let err = HttpError::from(PortError::Unexpected("connection reset by peer".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), SERVER_ERROR_MESSAGE);

        let conflict = HttpError::from(PortError::Conflict("Email is already registered".into()));
        assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(conflict.to_string(), "Email is already registered");
    }
}
