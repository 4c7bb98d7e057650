//! Inputs to the session state machine and the side effects it requests.

use std::sync::Arc;

use crate::domain::conversation::{RawPayload, TranscriptExport};
use crate::domain::evaluation::{EvaluationMetrics, ScoringRequest};
use crate::domain::foundation::{SessionId, Timestamp, UserSessionId};

/// Everything that can happen to a session.
///
/// Transport, timer, scorer and store results arrive here as plain events;
/// user actions do too. Time-bearing events carry their own timestamp so
/// transitions stay deterministic under test.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    // User actions
    RequestStart { has_permission: bool },
    RequestEnd { at: Timestamp },
    RetryEvaluation { at: Timestamp },
    RetryPersistence,
    DismissWarning,
    SubmitReflection(String),
    SkipReflection,
    DismissEvaluation,
    Reset,

    // Transport
    TransportConnected { at: Timestamp },
    MessageReceived { raw: RawPayload, received_at: Timestamp },
    CensorshipFlagged,
    TransportFailed(String),

    // Timer
    TimerWarning,

    // Scorer
    EvaluationReady(EvaluationMetrics),
    EvaluationFailed(String),

    // Session store
    SessionRecorded(UserSessionId),
    SessionRecordFailed(String),
    PersistenceSucceeded,
    PersistenceFailed(String),
}

impl SessionEvent {
    /// Stamps a raw payload with the current time.
    pub fn message(raw: impl Into<RawPayload>) -> Self {
        SessionEvent::MessageReceived {
            raw: raw.into(),
            received_at: Timestamp::now(),
        }
    }

    /// Whether a caller may issue this event directly.
    ///
    /// Collaborator results only come from the runtime's own effect tasks.
    /// `requestStart` is excluded too: its permission flag is read from the
    /// permission source, never taken from the caller.
    pub fn is_caller_issued(&self) -> bool {
        matches!(
            self,
            SessionEvent::RequestEnd { .. }
                | SessionEvent::RetryEvaluation { .. }
                | SessionEvent::RetryPersistence
                | SessionEvent::DismissWarning
                | SessionEvent::SubmitReflection(_)
                | SessionEvent::SkipReflection
                | SessionEvent::DismissEvaluation
                | SessionEvent::Reset
        )
    }

    /// Event name used in logs and rejection messages.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::RequestStart { .. } => "requestStart",
            SessionEvent::RequestEnd { .. } => "requestEnd",
            SessionEvent::RetryEvaluation { .. } => "retryEvaluation",
            SessionEvent::RetryPersistence => "retryPersistence",
            SessionEvent::DismissWarning => "dismissWarning",
            SessionEvent::SubmitReflection(_) => "submitReflection",
            SessionEvent::SkipReflection => "skipReflection",
            SessionEvent::DismissEvaluation => "dismissEvaluation",
            SessionEvent::Reset => "reset",
            SessionEvent::TransportConnected { .. } => "transportConnected",
            SessionEvent::MessageReceived { .. } => "messageReceived",
            SessionEvent::CensorshipFlagged => "censorshipFlagged",
            SessionEvent::TransportFailed(_) => "transportFailed",
            SessionEvent::TimerWarning => "timerWarning",
            SessionEvent::EvaluationReady(_) => "evaluationReady",
            SessionEvent::EvaluationFailed(_) => "evaluationFailed",
            SessionEvent::SessionRecorded(_) => "sessionRecorded",
            SessionEvent::SessionRecordFailed(_) => "sessionRecordFailed",
            SessionEvent::PersistenceSucceeded => "persistenceSucceeded",
            SessionEvent::PersistenceFailed(_) => "persistenceFailed",
        }
    }
}

/// Work the state machine asks its owner to perform.
///
/// The aggregate never performs I/O. Results of asynchronous effects come
/// back as [`SessionEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    BeginTransport,
    EndTransport,
    ArmTimer { started_at: Timestamp },
    CancelTimer,
    RecordSession { started_at: Timestamp },
    ExportTranscript(TranscriptExport),
    RequestEvaluation(ScoringRequest),
    PersistEvaluation {
        session_id: SessionId,
        user_session_id: UserSessionId,
        metrics: Arc<EvaluationMetrics>,
    },
    PersistReflection {
        user_session_id: UserSessionId,
        reflection: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_helper_stamps_now() {
        let before = Timestamp::now();
        match SessionEvent::message("hi") {
            SessionEvent::MessageReceived { raw, received_at } => {
                assert_eq!(raw, RawPayload::Text("hi".into()));
                assert!(received_at >= before);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn collaborator_results_are_not_caller_issued() {
        assert!(SessionEvent::RetryPersistence.is_caller_issued());
        assert!(SessionEvent::Reset.is_caller_issued());
        assert!(!SessionEvent::PersistenceSucceeded.is_caller_issued());
        assert!(!SessionEvent::SessionRecorded(UserSessionId::new()).is_caller_issued());
        assert!(!SessionEvent::TransportConnected { at: Timestamp::now() }.is_caller_issued());
        assert!(!SessionEvent::RequestStart { has_permission: true }.is_caller_issued());
    }

    #[test]
    fn names_are_camel_case() {
        assert_eq!(SessionEvent::TimerWarning.name(), "timerWarning");
        assert_eq!(
            SessionEvent::RequestStart { has_permission: true }.name(),
            "requestStart"
        );
    }
}
