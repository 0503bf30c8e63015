//! Checkpoint persistence for resumable runs
//!
//! One checkpoint resource exists per record id, overwritten after
//! every pipeline transition and deleted on terminal completion. A
//! checkpoint surviving a process restart is the sole resumability
//! mechanism. The primary implementation is [`FileCheckpointStore`];
//! [`MemoryCheckpointStore`] backs tests.

mod file;
mod memory;
mod traits;

pub use file::FileCheckpointStore;
pub use memory::MemoryCheckpointStore;
pub use traits::{
    Checkpoint, CheckpointError, CheckpointResult, CheckpointStore, CHECKPOINT_FORMAT_VERSION,
};
