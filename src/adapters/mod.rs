//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the session core to external systems:
//! - `transport` - Voice transport (scripted, for tests and replay)
//! - `scoring` - Evaluation scorers (HTTP, mock)
//! - `store` - In-memory session records and evaluations
//! - `postgres` - PostgreSQL session records and evaluations
//! - `export` - Transcript sinks (local filesystem, in-memory)
//! - `permission` - Static permission source

pub mod export;
pub mod permission;
pub mod postgres;
pub mod scoring;
pub mod store;
pub mod transport;

pub use export::{InMemoryTranscriptSink, LocalTranscriptSink};
pub use permission::StaticPermission;
pub use postgres::PostgresSessionStore;
pub use scoring::{HttpScorer, HttpScorerConfig, MockScorer};
pub use store::{InMemorySessionStore, StoredSession};
pub use transport::{ScriptedTransport, TransportStep};
