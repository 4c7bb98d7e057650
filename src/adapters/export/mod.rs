//! Transcript export adapters.

mod in_memory_sink;
mod local_file_sink;

pub use in_memory_sink::InMemoryTranscriptSink;
pub use local_file_sink::LocalTranscriptSink;
