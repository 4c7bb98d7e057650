//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresSessionStore` - Session rows, reflections and evaluation upserts

mod session_store;

pub use session_store::{PostgresSessionStore, SCHEMA};
