//! Application layer - runs sessions against their ports.
//!
//! The domain decides; this layer executes. It owns the per-session
//! runtime, the time-limit timer and the recovery wrapper used for side
//! work such as transcript export.

pub mod session;
pub mod supervisor;
pub mod timer;

pub use session::{RuntimeSettings, SessionHandle, SessionRuntime, SessionServices};
pub use supervisor::{
    Health, RecoveryExhausted, RecoveryPolicy, Supervised, Supervisor, TranscriptExporter,
};
pub use timer::{ConversationTimer, TimerHandle};
