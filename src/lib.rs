//! Canvass: resumable voter-record extraction pipeline
//!
//! Transforms raw, loosely-structured voter-file rows into validated,
//! confidence-scored records through a sequence of extraction stages,
//! with bounded retry on stage failure and routing to a human-review
//! queue when confidence or completeness falls short.
//!
//! # Core Concepts
//!
//! - **Facets**: the four record aspects (name, address, district,
//!   election), each owned by one pipeline stage
//! - **Runs**: one state-machine execution per record, checkpointed
//!   after every transition for crash-safe resumption
//! - **Review routing**: records below the accept threshold are
//!   enqueued to a pluggable review sink instead of completing silently
//!
//! # Example
//!
//! ```
//! use canvass::pipeline::{Orchestrator, BatchDriver};
//! use canvass::checkpoint::MemoryCheckpointStore;
//! use canvass::extract::MockExtractor;
//! use canvass::review::MemoryReviewSink;
//! use std::sync::Arc;
//!
//! let orchestrator = Orchestrator::new(
//!     Arc::new(MockExtractor::new()),
//!     Arc::new(MemoryCheckpointStore::new()),
//!     Arc::new(MemoryReviewSink::new()),
//! );
//! let driver = BatchDriver::new(orchestrator);
//! // Driver is ready to process records
//! ```

pub mod checkpoint;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod review;

pub use checkpoint::{Checkpoint, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use extract::{Extractor, Facet, FacetRequest, FacetResponse, HttpExtractor, MockExtractor};
pub use model::{RawRecord, VoterRecord};
pub use pipeline::{
    BatchDriver, CancelToken, Orchestrator, PipelineConfig, PipelineError, RetryPolicy, RunState,
    Stage, Transition,
};
pub use review::{MemoryReviewSink, ReviewSink, SqliteReviewSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
