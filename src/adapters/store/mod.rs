//! Session record and evaluation storage adapters.

mod in_memory;

pub use in_memory::{InMemorySessionStore, StoredSession};
