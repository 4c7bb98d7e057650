//! In-memory transcript sink for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::conversation::TranscriptExport;
use crate::ports::{ExportError, TranscriptSink};

/// Collects exports in memory; failures can be injected.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTranscriptSink {
    saved: Arc<Mutex<Vec<TranscriptExport>>>,
    failures: Arc<Mutex<VecDeque<ExportError>>>,
    attempts: Arc<Mutex<usize>>,
}

impl InMemoryTranscriptSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `save` fail.
    pub fn fail_next(self, error: ExportError) -> Self {
        self.failures.lock().unwrap().push_back(error);
        self
    }

    pub fn saved(&self) -> Vec<TranscriptExport> {
        self.saved.lock().unwrap().clone()
    }

    /// Number of `save` calls, failed ones included.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl TranscriptSink for InMemoryTranscriptSink {
    async fn save(&self, export: &TranscriptExport) -> Result<String, ExportError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.saved.lock().unwrap().push(export.clone());
        Ok(format!("memory://{}", export.file_name))
    }
}
