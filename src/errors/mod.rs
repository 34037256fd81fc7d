//! Error handling module for the watchlist backend.
//!
//! Maps store, validation and configuration failures to HTTP status codes and
//! the `{ "error": message, "code": CODE }` response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const CONFLICT: &str = "CONFLICT";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const REMOTE_REJECTED: &str = "REMOTE_REJECTED";
    pub const REMOTE_UNAVAILABLE: &str = "REMOTE_UNAVAILABLE";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or wrong static credential
    Unauthorized(String),
    /// Unsupported HTTP method
    MethodNotAllowed,
    /// Malformed request body
    BadRequest(String),
    /// A record violates an invariant
    Validation(ValidationError),
    /// Required configuration is missing
    Config(ConfigError),
    /// Stored content could not be decoded
    Decode(String),
    /// The file changed since it was read
    Conflict { status: u16, body: String },
    /// The remote API answered with a non-2xx status
    RemoteRejected { status: u16, body: String },
    /// The remote API could not be reached
    RemoteUnavailable(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::RemoteRejected { .. } => StatusCode::BAD_GATEWAY,
            AppError::RemoteUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::MethodNotAllowed => codes::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Config(_) => codes::CONFIG_ERROR,
            AppError::Decode(_) => codes::DECODE_ERROR,
            AppError::Conflict { .. } => codes::CONFLICT,
            AppError::RemoteRejected { .. } => codes::REMOTE_REJECTED,
            AppError::RemoteUnavailable(_) => codes::REMOTE_UNAVAILABLE,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Method Not Allowed".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(err) => err.to_string(),
            AppError::Config(err) => err.to_string(),
            AppError::Decode(msg) => format!("Stored file could not be decoded: {}", msg),
            AppError::Conflict { status, body } => format!(
                "Locations changed in the repository since they were loaded; reload and retry (GitHub {}: {})",
                status, body
            ),
            AppError::RemoteRejected { status, body } => format!("GitHub {}: {}", status, body),
            AppError::RemoteUnavailable(msg) => format!("GitHub unreachable: {}", msg),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(e) => AppError::Config(e),
            StoreError::RemoteUnavailable(msg) => AppError::RemoteUnavailable(msg),
            StoreError::RemoteRejected { status, body } => AppError::RemoteRejected { status, body },
            StoreError::Conflict { status, body } => AppError::Conflict { status, body },
            StoreError::Decode(msg) => {
                tracing::error!("Decode error: {}", msg);
                AppError::Decode(msg)
            }
            StoreError::Invalid(e) => AppError::Validation(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        AppError::Config(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            error: error.message(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
