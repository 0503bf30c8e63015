//! Review queue sink
//!
//! Records whose confidence or completeness falls below the accept
//! threshold are handed to a [`ReviewSink`] exactly once per run. The
//! sink is a pluggable collaborator: [`SqliteReviewSink`] persists to a
//! review table, [`MemoryReviewSink`] collects in order for tests.

mod sqlite;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::VoterRecord;

pub use sqlite::SqliteReviewSink;

/// Errors from review sink operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sink error: {0}")]
    Sink(String),
}

/// Write-only destination for records needing human review.
#[async_trait]
pub trait ReviewSink: Send + Sync {
    /// Enqueue one record for review.
    async fn enqueue(&self, record: &VoterRecord) -> Result<(), ReviewError>;
}

/// In-memory review sink preserving enqueue order.
#[derive(Default)]
pub struct MemoryReviewSink {
    queued: Mutex<Vec<VoterRecord>>,
}

impl MemoryReviewSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything enqueued so far, in order.
    pub fn queued(&self) -> Vec<VoterRecord> {
        self.queued.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.queued.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ReviewSink for MemoryReviewSink {
    async fn enqueue(&self, record: &VoterRecord) -> Result<(), ReviewError> {
        self.queued.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_preserves_order() {
        let sink = MemoryReviewSink::new();
        sink.enqueue(&VoterRecord::failed("a", "x", None)).await.unwrap();
        sink.enqueue(&VoterRecord::failed("b", "y", None)).await.unwrap();

        let queued = sink.queued();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].record_id, "a");
        assert_eq!(queued[1].record_id, "b");
    }
}
