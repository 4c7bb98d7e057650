//! Session runtime: drives one conversation session against its adapters.

mod listener;
mod runtime;

pub use runtime::{RuntimeSettings, SessionHandle, SessionRuntime, SessionServices};
