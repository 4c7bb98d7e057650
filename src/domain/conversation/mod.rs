//! Conversation domain module.
//!
//! Canonical utterances, the inbound payload normalizer, and the transcript
//! document rendered when a session ends.

mod message;
mod normalizer;
mod transcript;

pub use message::{ColorTag, Message, MessageSource};
pub use normalizer::{extract_speaker, normalize, RawPayload};
pub use transcript::{
    export_file_name, TranscriptExport, TranscriptFormatter, AI_FALLBACK_SPEAKER,
    TRANSCRIPT_EXTENSION, USER_SPEAKER,
};
