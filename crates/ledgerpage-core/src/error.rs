//! Error types for ledgerpage-core
//!
//! This module provides error handling for the pager: error codes,
//! detailed messages with suggestions, and the logging sink the pager
//! reports warnings and failures through.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

use crate::store::StoreError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Cursor token could not be decoded
    InvalidCursor,
    /// Request parameters are out of range
    InvalidRequest,
    /// The record store failed to answer a query
    StoreFailure,
    /// IO error
    IoError,
    /// Invalid data format
    InvalidFormat,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidCursor => write!(f, "INVALID_CURSOR"),
            ErrorCode::InvalidRequest => write!(f, "INVALID_REQUEST"),
            ErrorCode::StoreFailure => write!(f, "STORE_FAILURE"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - caller sent something we refuse
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for ledgerpage-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid cursor: {reason}")]
    InvalidCursor { cursor: String, reason: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Store query failed: {source}")]
    StoreFailure {
        #[from]
        source: StoreError,
    },

    #[error("IO error occurred")]
    IoError,

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidCursor { .. } => ErrorCode::InvalidCursor,
            CoreError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            CoreError::StoreFailure { .. } => ErrorCode::StoreFailure,
            CoreError::IoError => ErrorCode::IoError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::InvalidCursor { .. } => ErrorSeverity::Info,
            CoreError::InvalidRequest { .. } => ErrorSeverity::Warning,
            CoreError::StoreFailure { .. } => ErrorSeverity::Error,
            CoreError::IoError => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether the caller caused the error (4xx) rather than the server (5xx)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCursor { .. } | CoreError::InvalidRequest { .. }
        )
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::InvalidCursor { cursor, .. } => {
                details = details.with_detail(serde_json::json!({ "cursor": cursor }));
                details = details.with_suggestion(
                    "Pass back the nextCursor or prevCursor value from a previous response unchanged.".to_string()
                );
                details = details.with_suggestion(
                    "Omit the cursor parameter to start from the first page.".to_string()
                );
            }
            CoreError::InvalidRequest { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::StoreFailure { .. } => {
                details = details.with_suggestion(
                    "Retry the request; the data store did not answer.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Masked owner scope of the request
    pub scope: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            scope: None,
            operation,
            data: serde_json::json!({}),
        }
    }

    /// Add the (already masked) owner scope
    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Logging sink used by the pager and the legacy adapter
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
    /// Log debug information
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "ledgerpage::pager",
            "ERROR [{}] {} - Operation: {} - Scope: {:?} - Context: {}",
            error.code(),
            error.to_details(),
            context.operation,
            context.scope,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "ledgerpage::pager",
            "WARNING: {} - Operation: {} - Scope: {:?} - Context: {}",
            message,
            context.operation,
            context.scope,
            context.data
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "ledgerpage::pager",
            "DEBUG: {} - Operation: {} - Scope: {:?} - Context: {}",
            message,
            context.operation,
            context.scope,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidCursor.to_string(), "INVALID_CURSOR");
        assert_eq!(ErrorCode::StoreFailure.to_string(), "STORE_FAILURE");
        assert_eq!(
            serde_json::to_string(&ErrorCode::InvalidRequest).unwrap(),
            "\"INVALID_REQUEST\""
        );
    }

    #[test]
    fn test_client_vs_server_errors() {
        let invalid = CoreError::InvalidCursor {
            cursor: "!!".to_string(),
            reason: "not base64".to_string(),
        };
        assert!(invalid.is_client_error());
        assert_eq!(invalid.severity(), ErrorSeverity::Info);

        let failure = CoreError::from(StoreError::Timeout);
        assert!(!failure.is_client_error());
        assert_eq!(failure.code(), ErrorCode::StoreFailure);
        assert_eq!(failure.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_invalid_cursor_details() {
        let error = CoreError::InvalidCursor {
            cursor: "abc".to_string(),
            reason: "decoded value is not an id".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::InvalidCursor);
        assert_eq!(details.details, Some(serde_json::json!({ "cursor": "abc" })));
        assert_eq!(details.suggestions.len(), 2);
        assert!(details.to_string().starts_with("[INVALID_CURSOR]"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("page".to_string())
            .with_scope("user:12***".to_string())
            .with_data("limit", serde_json::json!(20));

        assert_eq!(context.operation, "page");
        assert_eq!(context.scope, Some("user:12***".to_string()));
        assert_eq!(context.data["limit"], 20);
    }
}
