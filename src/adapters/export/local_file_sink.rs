//! Local Filesystem Transcript Sink - Implementation of TranscriptSink.
//!
//! Writes transcript documents as UTF-8 text files into one directory.
//!
//! # Atomic Writes
//!
//! Content goes to `{file_name}.tmp`, is synced, then renamed into place,
//! so a crash never leaves a truncated transcript under the final name.
//! A failed write or rename removes the temp file.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::conversation::TranscriptExport;
use crate::ports::{ExportError, TranscriptSink};

/// Transcript sink rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalTranscriptSink {
    directory: PathBuf,
}

impl LocalTranscriptSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Resolves `file_name` inside the sink directory.
    ///
    /// Names containing path separators or parent references are rejected.
    fn target_path(&self, file_name: &str) -> Result<PathBuf, ExportError> {
        let invalid = file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.starts_with('.');
        if invalid {
            return Err(ExportError::InvalidName(file_name.to_string()));
        }
        Ok(self.directory.join(file_name))
    }
}

/// Writes `bytes` to `path` and waits until they reach the disk.
///
/// `flush` surfaces errors from writes tokio completed in the background.
async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl TranscriptSink for LocalTranscriptSink {
    async fn save(&self, export: &TranscriptExport) -> Result<String, ExportError> {
        let final_path = self.target_path(&export.file_name)?;
        let temp_path = self.directory.join(format!("{}.tmp", export.file_name));

        fs::create_dir_all(&self.directory).await.map_err(|e| {
            ExportError::Io(format!(
                "Failed to create directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        if let Err(e) = write_synced(&temp_path, export.document.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(ExportError::Io(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            )));
        }

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(ExportError::Io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            )));
        }

        Ok(final_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn export(name: &str) -> TranscriptExport {
        TranscriptExport {
            file_name: name.to_string(),
            document: "Conversation started: 01/02/2024 10:00:00\n\nUser (10:00:01): Hi\n".to_string(),
        }
    }

    fn create_sink() -> (LocalTranscriptSink, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sink = LocalTranscriptSink::new(temp_dir.path().join("transcripts"));
        (sink, temp_dir)
    }

    #[tokio::test]
    async fn save_creates_directory_and_file() {
        let (sink, _temp) = create_sink();
        let location = sink.save(&export("transcript_a.txt")).await.unwrap();

        let written = std::fs::read_to_string(&location).unwrap();
        assert!(written.contains("User (10:00:01): Hi"));
        assert!(!sink.directory().join("transcript_a.txt.tmp").exists());
    }

    #[tokio::test]
    async fn save_overwrites_same_name() {
        let (sink, _temp) = create_sink();
        sink.save(&export("t.txt")).await.unwrap();
        let mut second = export("t.txt");
        second.document = "replaced".into();
        let location = sink.save(&second).await.unwrap();
        assert_eq!(std::fs::read_to_string(location).unwrap(), "replaced");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_write_removes_temp_file() {
        let (sink, _temp) = create_sink();
        std::fs::create_dir_all(sink.directory()).unwrap();
        // Every write to /dev/full fails with ENOSPC.
        let temp_path = sink.directory().join("full.txt.tmp");
        std::os::unix::fs::symlink("/dev/full", &temp_path).unwrap();

        let result = sink.save(&export("full.txt")).await;

        assert!(matches!(result, Err(ExportError::Io(_))), "{:?}", result);
        assert!(std::fs::symlink_metadata(&temp_path).is_err());
        assert!(!sink.directory().join("full.txt").exists());
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let (sink, _temp) = create_sink();
        for name in ["../escape.txt", "a/b.txt", ".hidden", ""] {
            assert!(matches!(
                sink.save(&export(name)).await,
                Err(ExportError::InvalidName(_))
            ));
        }
    }
}
