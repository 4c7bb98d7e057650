//! Session-specific error types.

use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::ErrorCode;

use super::SessionPhase;

/// Errors surfaced by the conversation session.
///
/// `PermissionDenied` and `TransportFailure` are fatal and accompany the
/// `Failed` phase. `ScoringFailure` and `PersistenceFailure` leave the session
/// in `Ending` with a retry available. The remaining variants reject an event
/// without changing any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Microphone permission has not been granted")]
    PermissionDenied,

    #[error("Voice connection failed: {0}")]
    TransportFailure(String),

    #[error("Could not generate the evaluation: {0}")]
    ScoringFailure(String),

    #[error("Could not save the evaluation: {0}")]
    PersistenceFailure(String),

    #[error("Cannot {event} while the session is {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        event: &'static str,
    },

    #[error("Session is {phase}; {event} ignored until it finishes")]
    Busy {
        phase: SessionPhase,
        event: &'static str,
    },

    #[error("Cannot reset while the session is {0}; end the conversation first")]
    ResetNotAllowed(SessionPhase),

    #[error("Session record id already assigned")]
    AlreadyRecorded,

    #[error("{0} is reported by the session's collaborators, not by callers")]
    NotUserAction(&'static str),

    #[error("Session runtime is no longer running")]
    Unavailable,
}

impl SessionError {
    pub fn transport(reason: impl Into<String>) -> Self {
        SessionError::TransportFailure(reason.into())
    }

    pub fn scoring(reason: impl Into<String>) -> Self {
        SessionError::ScoringFailure(reason.into())
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        SessionError::PersistenceFailure(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::PermissionDenied => ErrorCode::PermissionDenied,
            SessionError::TransportFailure(_) => ErrorCode::TransportFailure,
            SessionError::ScoringFailure(_) => ErrorCode::ScoringFailure,
            SessionError::PersistenceFailure(_) => ErrorCode::PersistenceFailure,
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::Busy { .. } => ErrorCode::SessionBusy,
            SessionError::ResetNotAllowed(_) => ErrorCode::ResetNotAllowed,
            SessionError::AlreadyRecorded => ErrorCode::AlreadyRecorded,
            SessionError::NotUserAction(_) => ErrorCode::InvalidStateTransition,
            SessionError::Unavailable => ErrorCode::InternalError,
        }
    }

    /// Whether the session stays addressable with a retry transition.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::ScoringFailure(_) | SessionError::PersistenceFailure(_)
        )
    }

    /// Serializable form for the UI layer.
    pub fn to_view(&self) -> ErrorView {
        ErrorView {
            code: self.code(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

/// What the UI needs to render an error and choose retry or dismiss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorView {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_map_to_fatal_codes() {
        assert!(SessionError::PermissionDenied.code().is_fatal());
        assert!(SessionError::transport("socket closed").code().is_fatal());
        assert!(!SessionError::scoring("timeout").code().is_fatal());
    }

    #[test]
    fn only_scoring_and_persistence_are_retryable() {
        assert!(SessionError::scoring("x").is_retryable());
        assert!(SessionError::persistence("x").is_retryable());
        assert!(!SessionError::PermissionDenied.is_retryable());
        assert!(!SessionError::AlreadyRecorded.is_retryable());
    }

    #[test]
    fn messages_are_human_readable() {
        let err = SessionError::Busy {
            phase: SessionPhase::Saving,
            event: "requestEnd",
        };
        assert_eq!(
            err.to_string(),
            "Session is saving; requestEnd ignored until it finishes"
        );
        assert_eq!(
            SessionError::ResetNotAllowed(SessionPhase::Active).to_string(),
            "Cannot reset while the session is active; end the conversation first"
        );
    }

    #[test]
    fn view_carries_code_message_and_retry_hint() {
        let view = SessionError::persistence("db down").to_view();
        assert_eq!(view.code, ErrorCode::PersistenceFailure);
        assert!(view.message.contains("db down"));
        assert!(view.retryable);
    }
}
