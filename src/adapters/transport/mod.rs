//! Voice transport adapters.

mod scripted;

pub use scripted::{ScriptedTransport, TransportStep};
