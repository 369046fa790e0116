//! Dead-letter log for remote cleanup that could not be delivered.
//!
//! Cancellation and content-type switches must always converge locally, so
//! a failed remote delete is recorded here instead of failing the caller.
//! `drain` hands the entries to whoever wants to retry or report them.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOp {
    CancelUpload,
    DeleteVideo,
    DeleteMaterial,
    DeleteQuiz,
}

#[derive(Debug, Clone)]
pub struct CleanupEntry {
    pub op: CleanupOp,
    pub id: String,
    pub error: String,
}

#[derive(Clone, Default)]
pub struct CleanupLog {
    entries: Arc<Mutex<Vec<CleanupEntry>>>,
}

impl CleanupLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, op: CleanupOp, id: impl Into<String>, error: impl Into<String>) {
        let entry = CleanupEntry {
            op,
            id: id.into(),
            error: error.into(),
        };
        warn!(?entry.op, id = %entry.id, error = %entry.error, "remote cleanup dead-lettered");
        self.entries.lock().await.push(entry);
    }

    /// Removes and returns everything recorded so far.
    pub async fn drain(&self) -> Vec<CleanupEntry> {
        std::mem::take(&mut *self.entries.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_empties_the_log() {
        let log = CleanupLog::new();
        log.record(CleanupOp::DeleteVideo, "v1", "timeout").await;
        log.record(CleanupOp::CancelUpload, "up1", "503").await;

        let entries = log.drain().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].op, CleanupOp::DeleteVideo);
        assert!(log.is_empty().await);
    }
}
