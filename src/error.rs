//! Error types for the Attendance Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while decoding, classifying,
//! normalizing and aggregating attendance.

use serde::Serialize;
use thiserror::Error;

use crate::repository::RepositoryError;

/// The machine-distinguishable category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed device payload.
    Decode,
    /// A referenced employee, work day, punch or record does not exist.
    NotFound,
    /// Input rejected before any write happened.
    Validation,
    /// The backing store failed.
    Repository,
    /// A caller-supplied deadline elapsed.
    Deadline,
    /// Configuration could not be loaded.
    Config,
}

/// The main error type for the Attendance Engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::{EngineError, ErrorKind};
///
/// let error = EngineError::NotFound {
///     entity: "work day",
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "work day not found: 42");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A device payload could not be decoded.
    #[error("Failed to decode device record: {message}")]
    Decode {
        /// A description of what was wrong with the payload.
        message: String,
    },

    /// A referenced entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input failed validation.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The backing store reported a failure.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An operation did not complete before its deadline.
    #[error("{operation} exceeded its deadline of {timeout_ms} ms")]
    DeadlineExceeded {
        /// The operation that timed out.
        operation: &'static str,
        /// The deadline in milliseconds.
        timeout_ms: u64,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Decode { .. } => ErrorKind::Decode,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::Repository(_) => ErrorKind::Repository,
            EngineError::DeadlineExceeded { .. } => ErrorKind::Deadline,
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Config
            }
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        EngineError::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
