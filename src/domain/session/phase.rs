//! Session lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a conversation session is in its lifecycle.
///
/// ```text
/// Idle -> Connecting -> Active -> Warned -> Ending <-> Saving -> Completed
///   \         \           \         \
///    `---------`-----------`---------`--> Failed
/// Completed / Failed -> Idle (reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Permission granted, waiting for the transport to connect.
    Connecting,
    /// Live conversation.
    Active,
    /// Live conversation after the time-limit warning fired.
    Warned,
    /// Transport closed; waiting on scoring, or on a retry after a failure.
    Ending,
    /// Waiting on the persistence adapter.
    Saving,
    Completed,
    Failed,
}

impl SessionPhase {
    /// Live conversation states in which speech is accepted.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionPhase::Active | SessionPhase::Warned)
    }

    /// States waiting on an external asynchronous result.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionPhase::Ending | SessionPhase::Saving)
    }

    /// States in which a content-policy trip may be recorded.
    pub fn accepts_censorship(&self) -> bool {
        matches!(
            self,
            SessionPhase::Connecting | SessionPhase::Active | SessionPhase::Warned
        )
    }

    /// States in which inbound speech is appended to the log.
    pub fn accepts_messages(&self) -> bool {
        self.is_live() || self.is_in_flight()
    }

    /// States a fatal transport error can interrupt.
    pub fn has_open_transport(&self) -> bool {
        matches!(
            self,
            SessionPhase::Connecting | SessionPhase::Active | SessionPhase::Warned
        )
    }

    /// States from which `reset` is permitted.
    pub fn can_reset(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

impl StateMachine for SessionPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionPhase::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Idle, Failed)
                | (Connecting, Active)
                | (Connecting, Failed)
                | (Active, Warned)
                | (Active, Ending)
                | (Active, Failed)
                | (Warned, Ending)
                | (Warned, Failed)
                | (Ending, Saving)
                | (Saving, Completed)
                // persistence failed, retry-eligible
                | (Saving, Ending)
                | (Completed, Idle)
                | (Failed, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionPhase::*;
        match self {
            Idle => vec![Connecting, Failed],
            Connecting => vec![Active, Failed],
            Active => vec![Warned, Ending, Failed],
            Warned => vec![Ending, Failed],
            Ending => vec![Saving],
            Saving => vec![Completed, Ending],
            Completed => vec![Idle],
            Failed => vec![Idle],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Active => "active",
            SessionPhase::Warned => "warned",
            SessionPhase::Ending => "ending",
            SessionPhase::Saving => "saving",
            SessionPhase::Completed => "completed",
            SessionPhase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Transport connection status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}
