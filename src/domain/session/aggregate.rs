//! Conversation session aggregate.
//!
//! Owns everything about one in-progress conversation and is the only place
//! its state changes. All changes go through [`ConversationSession::apply`],
//! which either rejects the event (state untouched) or performs one legal
//! transition and returns the side effects the caller must carry out.
//!
//! # Invariants
//!
//! - `show_evaluation_modal` implies `evaluation` is present
//! - `user_session_id` is assigned at most once and never replaced
//! - the message log is append-only, in arrival order
//! - at most one scorer or persistence call is outstanding at a time
//! - evaluation metrics, once attached, are never replaced or mutated

use serde::Serialize;
use std::sync::Arc;

use crate::domain::conversation::{normalize, Message, TranscriptExport};
use crate::domain::evaluation::{EvaluationMetrics, ScoringRequest};
use crate::domain::foundation::{SessionId, StateMachine, Timestamp, UserId, UserSessionId};

use super::{ConnectionStatus, ErrorView, SessionEffect, SessionError, SessionEvent, SessionPhase};

/// The external call a session is currently suspended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlight {
    Evaluation,
    Persistence,
}

/// State of one conversation, from start request to saved evaluation.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: SessionId,
    user_id: UserId,
    phase: SessionPhase,
    permission_granted: bool,
    connection: ConnectionStatus,
    messages: Vec<Message>,
    is_censored: bool,
    started_at: Option<Timestamp>,
    ended_at: Option<Timestamp>,
    show_time_limit_warning: bool,
    show_reflection_modal: bool,
    is_reflection_pending: bool,
    reflection: Option<String>,
    show_evaluation_modal: bool,
    user_session_id: Option<UserSessionId>,
    record_pending: bool,
    evaluation: Option<Arc<EvaluationMetrics>>,
    in_flight: Option<InFlight>,
    error: Option<SessionError>,
}

impl ConversationSession {
    /// Creates an idle session for `user_id`.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            phase: SessionPhase::Idle,
            permission_granted: false,
            connection: ConnectionStatus::Disconnected,
            messages: Vec::new(),
            is_censored: false,
            started_at: None,
            ended_at: None,
            show_time_limit_warning: false,
            show_reflection_modal: false,
            is_reflection_pending: false,
            reflection: None,
            show_evaluation_modal: false,
            user_session_id: None,
            record_pending: false,
            evaluation: None,
            in_flight: None,
            error: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Read-only view of the log.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_censored(&self) -> bool {
        self.is_censored
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    pub fn is_ending(&self) -> bool {
        self.phase == SessionPhase::Ending
    }

    pub fn is_saving(&self) -> bool {
        self.phase == SessionPhase::Saving
    }

    pub fn show_time_limit_warning(&self) -> bool {
        self.show_time_limit_warning
    }

    pub fn show_reflection_modal(&self) -> bool {
        self.show_reflection_modal
    }

    pub fn is_reflection_pending(&self) -> bool {
        self.is_reflection_pending
    }

    pub fn reflection(&self) -> Option<&str> {
        self.reflection.as_deref()
    }

    pub fn show_evaluation_modal(&self) -> bool {
        self.show_evaluation_modal
    }

    pub fn user_session_id(&self) -> Option<UserSessionId> {
        self.user_session_id
    }

    pub fn evaluation(&self) -> Option<&Arc<EvaluationMetrics>> {
        self.evaluation.as_ref()
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    /// Current fatal or recoverable error, if any.
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Serializable snapshot for the UI layer.
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            phase: self.phase,
            permission_granted: self.permission_granted,
            connection_status: self.connection,
            messages: self.messages.clone(),
            is_censored: self.is_censored,
            conversation_start_time: self.started_at,
            is_ending: self.is_ending(),
            is_saving: self.is_saving(),
            show_time_limit_warning: self.show_time_limit_warning,
            show_reflection_modal: self.show_reflection_modal,
            is_reflection_pending: self.is_reflection_pending,
            show_evaluation_modal: self.show_evaluation_modal,
            user_session_id: self.user_session_id,
            evaluation_data: self.evaluation.as_deref().cloned(),
            error: self.error.as_ref().map(SessionError::to_view),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns a rejection (`InvalidTransition`, `Busy`, `ResetNotAllowed`,
    /// `AlreadyRecorded`) when the event is not legal in the current phase.
    /// A rejected event leaves the session unchanged. Fatal and recoverable
    /// failures are not errors here: they are recorded on the session and
    /// readable through [`error`](Self::error).
    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<SessionEffect>, SessionError> {
        let name = event.name();
        match event {
            SessionEvent::RequestStart { has_permission } => self.request_start(has_permission),
            SessionEvent::TransportConnected { at } => self.transport_connected(at),
            SessionEvent::MessageReceived { raw, received_at } => {
                if !self.phase.accepts_messages() {
                    return Err(self.invalid(name));
                }
                self.messages.push(normalize(raw, received_at));
                Ok(vec![])
            }
            SessionEvent::TimerWarning => {
                if self.phase == SessionPhase::Active {
                    self.move_to(SessionPhase::Warned)?;
                    self.show_time_limit_warning = true;
                }
                Ok(vec![])
            }
            SessionEvent::CensorshipFlagged => {
                if self.phase.accepts_censorship() {
                    self.is_censored = true;
                }
                Ok(vec![])
            }
            SessionEvent::TransportFailed(reason) => {
                if !self.phase.has_open_transport() {
                    return Ok(vec![]);
                }
                let had_timer = self.phase.is_live();
                self.move_to(SessionPhase::Failed)?;
                self.connection = ConnectionStatus::Disconnected;
                self.error = Some(SessionError::TransportFailure(reason));
                Ok(if had_timer { vec![SessionEffect::CancelTimer] } else { vec![] })
            }
            SessionEvent::RequestEnd { at } => self.request_end(at),
            SessionEvent::EvaluationReady(metrics) => self.evaluation_ready(metrics),
            SessionEvent::EvaluationFailed(reason) => {
                if self.phase == SessionPhase::Ending && self.in_flight == Some(InFlight::Evaluation) {
                    self.in_flight = None;
                    self.error = Some(SessionError::ScoringFailure(reason));
                }
                Ok(vec![])
            }
            SessionEvent::RetryEvaluation { at } => self.retry_evaluation(at),
            SessionEvent::SessionRecorded(id) => self.session_recorded(id),
            SessionEvent::SessionRecordFailed(reason) => {
                self.record_pending = false;
                if self.awaiting_record() {
                    self.error = Some(SessionError::PersistenceFailure(reason));
                }
                Ok(vec![])
            }
            SessionEvent::PersistenceSucceeded => {
                if self.phase != SessionPhase::Saving {
                    return Ok(vec![]);
                }
                self.move_to(SessionPhase::Completed)?;
                self.in_flight = None;
                self.error = None;
                self.show_evaluation_modal = self.evaluation.is_some();
                Ok(vec![])
            }
            SessionEvent::PersistenceFailed(reason) => {
                if self.phase != SessionPhase::Saving {
                    return Ok(vec![]);
                }
                self.move_to(SessionPhase::Ending)?;
                self.in_flight = None;
                self.error = Some(SessionError::PersistenceFailure(reason));
                Ok(vec![])
            }
            SessionEvent::RetryPersistence => self.retry_persistence(),
            SessionEvent::DismissWarning => {
                self.show_time_limit_warning = false;
                Ok(vec![])
            }
            SessionEvent::SubmitReflection(text) => {
                if !self.show_reflection_modal {
                    return Err(self.invalid(name));
                }
                self.show_reflection_modal = false;
                self.is_reflection_pending = false;
                self.reflection = Some(text.clone());
                Ok(self
                    .user_session_id
                    .map(|user_session_id| SessionEffect::PersistReflection {
                        user_session_id,
                        reflection: text,
                    })
                    .into_iter()
                    .collect())
            }
            SessionEvent::SkipReflection => {
                if !self.show_reflection_modal {
                    return Err(self.invalid(name));
                }
                self.show_reflection_modal = false;
                self.is_reflection_pending = false;
                Ok(vec![])
            }
            SessionEvent::DismissEvaluation => {
                if self.phase != SessionPhase::Completed || !self.show_evaluation_modal {
                    return Err(self.invalid(name));
                }
                self.show_evaluation_modal = false;
                Ok(vec![])
            }
            SessionEvent::Reset => {
                if !self.phase.can_reset() {
                    return Err(SessionError::ResetNotAllowed(self.phase));
                }
                *self = Self::new(self.user_id.clone());
                Ok(vec![])
            }
        }
    }

    fn request_start(&mut self, has_permission: bool) -> Result<Vec<SessionEffect>, SessionError> {
        match self.phase {
            SessionPhase::Idle => {}
            // A failed attempt is restartable without an explicit reset.
            SessionPhase::Failed => *self = Self::new(self.user_id.clone()),
            phase if phase.is_in_flight() => return Err(self.busy("requestStart")),
            _ => return Err(self.invalid("requestStart")),
        }

        self.permission_granted = has_permission;
        if !has_permission {
            self.move_to(SessionPhase::Failed)?;
            self.error = Some(SessionError::PermissionDenied);
            return Ok(vec![]);
        }

        self.move_to(SessionPhase::Connecting)?;
        self.connection = ConnectionStatus::Connecting;
        Ok(vec![SessionEffect::BeginTransport])
    }

    fn transport_connected(&mut self, at: Timestamp) -> Result<Vec<SessionEffect>, SessionError> {
        if self.phase != SessionPhase::Connecting {
            return Err(self.invalid("transportConnected"));
        }
        self.move_to(SessionPhase::Active)?;
        self.connection = ConnectionStatus::Connected;
        self.started_at = Some(at);

        let mut effects = vec![SessionEffect::ArmTimer { started_at: at }];
        if self.user_session_id.is_none() && !self.record_pending {
            self.record_pending = true;
            effects.push(SessionEffect::RecordSession { started_at: at });
        }
        Ok(effects)
    }

    fn request_end(&mut self, at: Timestamp) -> Result<Vec<SessionEffect>, SessionError> {
        if self.phase.is_in_flight() {
            return Err(self.busy("requestEnd"));
        }
        if !self.phase.is_live() {
            return Err(self.invalid("requestEnd"));
        }

        self.move_to(SessionPhase::Ending)?;
        self.connection = ConnectionStatus::Disconnected;
        self.ended_at = Some(at);
        self.show_reflection_modal = true;
        self.is_reflection_pending = true;
        self.in_flight = Some(InFlight::Evaluation);
        self.error = None;

        let export =
            TranscriptExport::build(&self.id, &self.user_id, &self.messages, self.started_at, at);
        Ok(vec![
            SessionEffect::CancelTimer,
            SessionEffect::EndTransport,
            SessionEffect::ExportTranscript(export),
            SessionEffect::RequestEvaluation(self.scoring_request(at)),
        ])
    }

    fn evaluation_ready(&mut self, metrics: EvaluationMetrics) -> Result<Vec<SessionEffect>, SessionError> {
        if self.phase != SessionPhase::Ending
            || self.in_flight != Some(InFlight::Evaluation)
            || self.evaluation.is_some()
        {
            return Ok(vec![]);
        }
        self.in_flight = None;
        self.evaluation = Some(Arc::new(metrics));
        self.begin_persistence()
    }

    fn retry_evaluation(&mut self, at: Timestamp) -> Result<Vec<SessionEffect>, SessionError> {
        match self.phase {
            SessionPhase::Saving => return Err(self.busy("retryEvaluation")),
            SessionPhase::Ending if self.in_flight.is_some() => {
                return Err(self.busy("retryEvaluation"))
            }
            SessionPhase::Ending if self.evaluation.is_none() => {}
            _ => return Err(self.invalid("retryEvaluation")),
        }
        self.in_flight = Some(InFlight::Evaluation);
        self.error = None;
        let ended_at = self.ended_at.unwrap_or(at);
        Ok(vec![SessionEffect::RequestEvaluation(self.scoring_request(ended_at))])
    }

    fn retry_persistence(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        match self.phase {
            SessionPhase::Saving => return Err(self.busy("retryPersistence")),
            SessionPhase::Ending if self.in_flight.is_some() => {
                return Err(self.busy("retryPersistence"))
            }
            SessionPhase::Ending if self.evaluation.is_some() => {}
            _ => return Err(self.invalid("retryPersistence")),
        }
        self.error = None;
        self.begin_persistence()
    }

    fn session_recorded(&mut self, id: UserSessionId) -> Result<Vec<SessionEffect>, SessionError> {
        if self.user_session_id.is_some() {
            return Err(SessionError::AlreadyRecorded);
        }
        self.user_session_id = Some(id);
        self.record_pending = false;

        let mut effects = Vec::new();
        if let Some(reflection) = &self.reflection {
            effects.push(SessionEffect::PersistReflection {
                user_session_id: id,
                reflection: reflection.clone(),
            });
        }
        if self.awaiting_record() {
            self.error = None;
            effects.extend(self.begin_persistence()?);
        }
        Ok(effects)
    }

    /// Sends retained metrics to the store, or asks for a session record first.
    fn begin_persistence(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        let Some(metrics) = self.evaluation.clone() else {
            return Ok(vec![]);
        };

        match self.user_session_id {
            Some(user_session_id) => {
                self.move_to(SessionPhase::Saving)?;
                self.in_flight = Some(InFlight::Persistence);
                Ok(vec![SessionEffect::PersistEvaluation {
                    session_id: self.id,
                    user_session_id,
                    metrics,
                }])
            }
            None => {
                self.error = Some(SessionError::persistence("session record is not available yet"));
                if self.record_pending {
                    return Ok(vec![]);
                }
                self.record_pending = true;
                let started_at = self.started_at.or(self.ended_at).unwrap_or_else(Timestamp::now);
                Ok(vec![SessionEffect::RecordSession { started_at }])
            }
        }
    }

    /// Metrics are held in `Ending` with nothing outstanding but the record id.
    fn awaiting_record(&self) -> bool {
        self.phase == SessionPhase::Ending && self.evaluation.is_some() && self.in_flight.is_none()
    }

    fn scoring_request(&self, ended_at: Timestamp) -> ScoringRequest {
        ScoringRequest::new(self.id, self.messages.clone(), self.started_at, ended_at)
    }

    fn move_to(&mut self, target: SessionPhase) -> Result<(), SessionError> {
        let phase = self.phase;
        self.phase
            .advance(target)
            .map(|_| ())
            .map_err(|_| SessionError::InvalidTransition {
                phase,
                event: "internal",
            })
    }

    fn invalid(&self, event: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            phase: self.phase,
            event,
        }
    }

    fn busy(&self, event: &'static str) -> SessionError {
        SessionError::Busy {
            phase: self.phase,
            event,
        }
    }
}

/// Serializable snapshot handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub permission_granted: bool,
    pub connection_status: ConnectionStatus,
    pub messages: Vec<Message>,
    pub is_censored: bool,
    pub conversation_start_time: Option<Timestamp>,
    pub is_ending: bool,
    pub is_saving: bool,
    pub show_time_limit_warning: bool,
    pub show_reflection_modal: bool,
    pub is_reflection_pending: bool,
    pub show_evaluation_modal: bool,
    pub user_session_id: Option<UserSessionId>,
    pub evaluation_data: Option<EvaluationMetrics>,
    pub error: Option<ErrorView>,
}
