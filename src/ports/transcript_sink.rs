//! Transcript Sink Port - File-save collaborator for transcripts.
//!
//! Receives the formatted transcript document and its deterministic file
//! name when a conversation ends.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::TranscriptExport;

#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Saves the document under `export.file_name`.
    ///
    /// Writes are atomic: a failed save leaves no partial file behind.
    /// Returns a human-readable location of the saved transcript.
    async fn save(&self, export: &TranscriptExport) -> Result<String, ExportError>;
}

/// Errors that can occur while saving a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("invalid transcript file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(String),
}
