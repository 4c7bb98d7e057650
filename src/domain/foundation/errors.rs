//! Error types for the domain layer.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // State errors
    InvalidStateTransition,
    SessionBusy,
    ResetNotAllowed,
    AlreadyRecorded,

    // Fatal session errors
    PermissionDenied,
    TransportFailure,

    // Recoverable session errors
    ScoringFailure,
    PersistenceFailure,

    // Infrastructure errors
    ExportFailure,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionBusy => "SESSION_BUSY",
            ErrorCode::ResetNotAllowed => "RESET_NOT_ALLOWED",
            ErrorCode::AlreadyRecorded => "ALREADY_RECORDED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::TransportFailure => "TRANSPORT_FAILURE",
            ErrorCode::ScoringFailure => "SCORING_FAILURE",
            ErrorCode::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorCode::ExportFailure => "EXPORT_FAILURE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

impl ErrorCode {
    /// Returns true for errors that end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorCode::PermissionDenied | ErrorCode::TransportFailure)
    }
}
