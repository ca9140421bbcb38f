//! Error types for CiteForge
//!
//! Provides a small error handling system with:
//! - Distinct error types for different failure modes
//! - Process exit code mapping
//! - Error codes for machine-readable reports
//!
//! Expected scoring edge cases (empty texts, empty groups, invalid
//! adjustment parameters) are never errors; they are values in the
//! scoring crate. Only failures of the surrounding collaborators end up here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    ValidationError,
    InvalidCitationRow,

    // Resource errors (4xxx)
    NotFound,

    // Storage errors (7xxx)
    IoError,
    SnapshotError,

    // Limits (8xxx)
    DeadlineExceeded,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidCitationRow => 1002,

            ErrorCode::NotFound => 4001,

            ErrorCode::IoError => 7001,
            ErrorCode::SnapshotError => 7002,

            ErrorCode::DeadlineExceeded => 8001,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Invalid citation row at line {line}: {message}")]
    InvalidCitationRow { line: usize, message: String },

    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Distance snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidCitationRow { .. } => ErrorCode::InvalidCitationRow,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Io { .. } => ErrorCode::IoError,
            AppError::Snapshot { .. } => ErrorCode::SnapshotError,
            AppError::DeadlineExceeded { .. } => ErrorCode::DeadlineExceeded,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Process exit code for this error
    ///
    /// Follows the BSD `sysexits.h` ranges so scripts can tell bad input
    /// apart from environment failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            // EX_DATAERR
            AppError::Validation { .. } |
            AppError::InvalidCitationRow { .. } => 65,

            // EX_NOINPUT
            AppError::NotFound { .. } => 66,

            // EX_IOERR
            AppError::Io { .. } |
            AppError::Snapshot { .. } => 74,

            // EX_TEMPFAIL
            AppError::DeadlineExceeded { .. } => 75,

            // EX_CONFIG
            AppError::Configuration { .. } => 78,

            // EX_SOFTWARE
            AppError::Internal { .. } |
            AppError::Serialization(_) |
            AppError::Other(_) => 70,
        }
    }

    /// Check if the failure was caused by the caller's input
    pub fn is_input_error(&self) -> bool {
        matches!(self.exit_code(), 65 | 66)
    }

    /// Build an I/O error for a path
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        AppError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Structured error report, printed by the CLI in JSON mode
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub numeric_code: u16,
    pub message: String,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        let code = err.code();
        Self {
            code,
            numeric_code: code.as_code(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io {
            path: "<unknown>".to_string(),
            message: err.to_string()
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string()
        }
    }
}
