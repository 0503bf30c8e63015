//! In-memory checkpoint store
//!
//! Backs tests and ephemeral runs. Entries are stored serialized so the
//! serde path is exercised exactly as with the file store.

use async_trait::async_trait;
use dashmap::DashMap;

use super::traits::{Checkpoint, CheckpointResult, CheckpointStore};

/// Checkpoint store keeping serialized entries in memory.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    entries: DashMap<String, String>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let payload = serde_json::to_string(checkpoint)?;
        self.entries
            .insert(checkpoint.state.record_id.clone(), payload);
        Ok(())
    }

    async fn load(&self, record_id: &str) -> CheckpointResult<Option<Checkpoint>> {
        let Some(payload) = self.entries.get(record_id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        let checkpoint: Checkpoint = serde_json::from_str(&payload)?;
        checkpoint.verify_version()?;
        Ok(Some(checkpoint))
    }

    async fn exists(&self, record_id: &str) -> CheckpointResult<bool> {
        Ok(self.entries.contains_key(record_id))
    }

    async fn delete(&self, record_id: &str) -> CheckpointResult<bool> {
        Ok(self.entries.remove(record_id).is_some())
    }
}
