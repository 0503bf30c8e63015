//! Checkpoint store trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::{RunState, Stage};

/// Version tag written into every serialized checkpoint so stores can
/// reject shapes produced by an incompatible deployment.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported checkpoint format version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Persisted snapshot of one run: the full state plus the stage to
/// execute next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub format_version: u32,
    pub state: RunState,
    pub next_stage: Stage,
}

impl Checkpoint {
    pub fn new(state: RunState, next_stage: Stage) -> Self {
        Self {
            format_version: CHECKPOINT_FORMAT_VERSION,
            state,
            next_stage,
        }
    }

    /// Reject checkpoints written by an incompatible format version.
    pub fn verify_version(&self) -> CheckpointResult<()> {
        if self.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                found: self.format_version,
                expected: CHECKPOINT_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

/// Trait for checkpoint storage backends.
///
/// Implementations must be thread-safe; each record id's resource is
/// exclusively owned by its run, so no cross-record locking is needed
/// as long as one run per id holds.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Create or overwrite the checkpoint for its record id.
    async fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<()>;

    /// Load a checkpoint by record id.
    async fn load(&self, record_id: &str) -> CheckpointResult<Option<Checkpoint>>;

    /// Whether a checkpoint exists for the record id.
    async fn exists(&self, record_id: &str) -> CheckpointResult<bool>;

    /// Delete a checkpoint; returns whether one existed.
    async fn delete(&self, record_id: &str) -> CheckpointResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRecord;

    #[test]
    fn version_verification_rejects_foreign_shapes() {
        let mut checkpoint = Checkpoint::new(RunState::new("r", RawRecord::new()), Stage::Name);
        assert!(checkpoint.verify_version().is_ok());

        checkpoint.format_version = 99;
        let err = checkpoint.verify_version().unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::VersionMismatch { found: 99, expected: CHECKPOINT_FORMAT_VERSION }
        ));
    }
}
