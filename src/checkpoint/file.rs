//! File-backed checkpoint store
//!
//! One JSON file per record id under a base directory. Writes go
//! through a temp file and rename so a crash mid-write never leaves a
//! truncated checkpoint behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::traits::{Checkpoint, CheckpointError, CheckpointResult, CheckpointStore};

/// Checkpoint store writing one file per record id.
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> CheckpointResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, record_id: &str) -> PathBuf {
        self.dir.join(format!("{record_id}.json"))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let path = self.path_for(&checkpoint.state.record_id);
        let tmp = path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(checkpoint)?;
        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load(&self, record_id: &str) -> CheckpointResult<Option<Checkpoint>> {
        let path = self.path_for(record_id);
        let payload = match tokio::fs::read(&path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::Io(e)),
        };
        let checkpoint: Checkpoint = serde_json::from_slice(&payload)?;
        checkpoint.verify_version()?;
        Ok(Some(checkpoint))
    }

    async fn exists(&self, record_id: &str) -> CheckpointResult<bool> {
        Ok(tokio::fs::try_exists(self.path_for(record_id)).await?)
    }

    async fn delete(&self, record_id: &str) -> CheckpointResult<bool> {
        match tokio::fs::remove_file(self.path_for(record_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CheckpointError::Io(e)),
        }
    }
}
