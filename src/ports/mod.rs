//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the session core and the outside world. Adapters implement these ports.
//!
//! ## Conversation Ports
//!
//! - `VoiceTransport` / `TransportListener` - Live speech-to-speech connection
//! - `PermissionSource` - Microphone permission, read on each start request
//!
//! ## End-of-Session Ports
//!
//! - `EvaluationScorer` - Opaque scoring of the finished conversation
//! - `SessionRecorder` - Persisted session row and reflection text
//! - `EvaluationStore` - Upsert of evaluation metrics against the session row
//! - `TranscriptSink` - File-save collaborator for transcript exports

mod evaluation_scorer;
mod evaluation_store;
mod permission_source;
mod session_recorder;
mod transcript_sink;
mod voice_transport;

pub use evaluation_scorer::{EvaluationScorer, ScoringError};
pub use evaluation_store::{EvaluationStore, StoreError};
pub use permission_source::PermissionSource;
pub use session_recorder::SessionRecorder;
pub use transcript_sink::{ExportError, TranscriptSink};
pub use voice_transport::{TransportError, TransportListener, VoiceTransport};
