//! Error handling module for the status board backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Message returned to clients in place of storage failure details.
pub const STORAGE_PUBLIC_MESSAGE: &str = "Failed to access status storage";

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input
    Validation(String),
    /// Unknown entity
    NotFound(String),
    /// Duplicate entity id
    Conflict(String),
    /// Persistence failure or malformed persisted data
    Storage(String),
    /// Unparseable request body
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the internal error message, including storage details.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Storage(msg)
            | AppError::BadRequest(msg) => msg,
        }
    }

    /// Get the message that is safe to show to clients.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Storage(_) => STORAGE_PUBLIC_MESSAGE,
            other => other.message(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Storage(format!("Database error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Filesystem error: {:?}", err);
        AppError::Storage(format!("Filesystem error: {}", err))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.public_message().to_string(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "Request failed: {}", self.message());
        } else {
            tracing::warn!(code = self.error_code(), "Request rejected: {}", self.message());
        }

        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
