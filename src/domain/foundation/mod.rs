//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the state machine trait
//! that form the vocabulary of the conversation session domain.

mod context;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use context::SessionContext;
pub use errors::{ErrorCode, ValidationError};
pub use ids::{MessageId, SessionId, UserId, UserSessionId};
pub use state_machine::StateMachine;
pub use timestamp::{Timestamp, CLOCK_FORMAT, DATE_TIME_FORMAT};
