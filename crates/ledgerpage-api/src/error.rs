//! Error types for ledgerpage-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgerpage_core::{CoreError, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Core(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for the response body
    pub fn code(&self) -> String {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND".to_string(),
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Unauthorized { .. } => "UNAUTHORIZED".to_string(),
            ApiError::Core(error) => error.code().to_string(),
        }
    }

    /// Log level class of the error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ApiError::NotFound { .. } => ErrorSeverity::Info,
            ApiError::BadRequest { .. } | ApiError::Unauthorized { .. } => ErrorSeverity::Warning,
            ApiError::Core(error) => error.severity(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Core(error) => error.to_details().message,
            other => other.to_string(),
        };

        match self.severity() {
            ErrorSeverity::Error => log::error!("[{}] {} {}", self.code(), status, message),
            ErrorSeverity::Warning => log::warn!("[{}] {} {}", self.code(), status, message),
            ErrorSeverity::Info => log::debug!("[{}] {} {}", self.code(), status, message),
        }

        let body = serde_json::json!({
            "error": message,
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}
