//! Session domain module.
//!
//! The conversation session lifecycle: phases, the events that drive them,
//! the effects they request, and the aggregate that ties them together.
//!
//! # Flow
//!
//! Events from the transport, the timer, the scorer, the session store and
//! the user are applied one at a time to a [`ConversationSession`]. Each
//! accepted event yields zero or more [`SessionEffect`]s for the owner to
//! execute; their results come back as further events.

mod aggregate;
mod errors;
mod events;
mod phase;

pub use aggregate::{ConversationSession, InFlight, SessionView};
pub use errors::{ErrorView, SessionError};
pub use events::{SessionEffect, SessionEvent};
pub use phase::{ConnectionStatus, SessionPhase};
