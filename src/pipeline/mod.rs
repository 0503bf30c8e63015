//! Record extraction pipeline
//!
//! The orchestration core: a resumable state machine that sequences the
//! four facet stages, aggregates per-stage confidence, decides retry
//! vs. continue vs. escalate-to-review, and checkpoints after every
//! transition so an interrupted run resumes from its last completed
//! stage.
//!
//! # Architecture
//!
//! - **[`StageHandler`] trait**: one node per facet, emitting tagged
//!   [`Transition`]s instead of dispatching on node types
//! - **[`Orchestrator`]**: the central dispatch loop, checkpointing and
//!   review routing
//! - **[`BatchDriver`]**: sequential multi-record processing with
//!   per-record failure isolation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use canvass::checkpoint::FileCheckpointStore;
//! use canvass::extract::HttpExtractor;
//! use canvass::pipeline::{BatchDriver, Orchestrator};
//! use canvass::review::SqliteReviewSink;
//!
//! let orchestrator = Orchestrator::new(
//!     Arc::new(HttpExtractor::new("http://localhost:11434")?),
//!     Arc::new(FileCheckpointStore::open("checkpoints")?),
//!     Arc::new(SqliteReviewSink::open("review.db")?),
//! );
//! let driver = BatchDriver::new(orchestrator);
//! let records = driver.process(raw_records).await;
//! ```

mod aggregate;
mod assemble;
mod batch;
mod cancel;
mod config;
pub mod fields;
mod retry;
mod runner;
pub mod stages;
mod state;

pub use aggregate::{aggregate, Aggregate};
pub use assemble::assemble;
pub use batch::BatchDriver;
pub use cancel::CancelToken;
pub use config::PipelineConfig;
pub use retry::{begin_attempt, should_retry, RetryPolicy};
pub use runner::{Orchestrator, PipelineError};
pub use stages::StageHandler;
pub use state::{RunState, Stage, Transition};
