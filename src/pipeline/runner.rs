//! Pipeline runner — the central state-machine dispatch loop
//!
//! Drives one record through Name → Address → District → Election →
//! Assemble, interpreting the [`Transition`] each stage handler emits.
//! After every transition the run state is checkpointed together with
//! the upcoming stage, so a crash between transitions loses at most the
//! in-flight stage. On a terminal state the checkpoint is deleted and
//! review-flagged records are enqueued to the review sink.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use super::aggregate;
use super::assemble;
use super::cancel::CancelToken;
use super::config::PipelineConfig;
use super::retry;
use super::stages::{AddressStage, DistrictStage, ElectionStage, NameStage, StageHandler};
use super::state::{RunState, Stage, Transition};
use crate::checkpoint::{Checkpoint, CheckpointError, CheckpointStore};
use crate::extract::Extractor;
use crate::model::{RawRecord, VoterRecord};
use crate::review::{ReviewError, ReviewSink};

/// Errors surfaced to runner callers.
///
/// Stage-level failures never appear here; they degrade the record
/// instead. What remains is the defensive boundary: resume misses and
/// collaborator failures the run cannot absorb.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no checkpoint found for record {0}")]
    CheckpointNotFound(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("review sink error: {0}")]
    Review(#[from] ReviewError),
}

/// Runs individual records through the extraction state machine.
pub struct Orchestrator {
    handlers: Vec<Box<dyn StageHandler>>,
    checkpoints: Arc<dyn CheckpointStore>,
    review_sink: Arc<dyn ReviewSink>,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create a runner with default configuration.
    pub fn new(
        extractor: Arc<dyn Extractor>,
        checkpoints: Arc<dyn CheckpointStore>,
        review_sink: Arc<dyn ReviewSink>,
    ) -> Self {
        Self::with_config(extractor, checkpoints, review_sink, PipelineConfig::default())
    }

    pub fn with_config(
        extractor: Arc<dyn Extractor>,
        checkpoints: Arc<dyn CheckpointStore>,
        review_sink: Arc<dyn ReviewSink>,
        config: PipelineConfig,
    ) -> Self {
        let retry = config.retry;
        let handlers: Vec<Box<dyn StageHandler>> = vec![
            Box::new(NameStage::new(extractor.clone(), retry)),
            Box::new(AddressStage::new(extractor.clone(), retry)),
            Box::new(DistrictStage::new(extractor.clone(), retry)),
            Box::new(ElectionStage::new(extractor, retry)),
        ];
        Self {
            handlers,
            checkpoints,
            review_sink,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn handler(&self, stage: Stage) -> Option<&dyn StageHandler> {
        self.handlers
            .iter()
            .map(|h| h.as_ref())
            .find(|h| h.stage() == stage)
    }

    /// Process one raw record from the start.
    pub async fn run(
        &self,
        record_id: &str,
        raw_record: RawRecord,
    ) -> Result<VoterRecord, PipelineError> {
        self.run_with_cancel(record_id, raw_record, &CancelToken::new())
            .await
    }

    /// Process one raw record, honoring a caller-held cancellation token.
    pub async fn run_with_cancel(
        &self,
        record_id: &str,
        raw_record: RawRecord,
        cancel: &CancelToken,
    ) -> Result<VoterRecord, PipelineError> {
        info!(record_id, "processing record");
        let state = RunState::new(record_id, raw_record);
        // The Start → Name transition creates the checkpoint resource.
        self.write_checkpoint(&state, Stage::Name).await;
        self.drive(state, Stage::Name, cancel).await
    }

    /// Resume an interrupted record from its checkpoint.
    pub async fn resume(&self, record_id: &str) -> Result<VoterRecord, PipelineError> {
        self.resume_with_cancel(record_id, &CancelToken::new()).await
    }

    pub async fn resume_with_cancel(
        &self,
        record_id: &str,
        cancel: &CancelToken,
    ) -> Result<VoterRecord, PipelineError> {
        let checkpoint = self
            .checkpoints
            .load(record_id)
            .await?
            .ok_or_else(|| PipelineError::CheckpointNotFound(record_id.to_string()))?;
        info!(
            record_id,
            stage = %checkpoint.next_stage,
            "resuming record from checkpoint"
        );
        self.drive(checkpoint.state, checkpoint.next_stage, cancel).await
    }

    /// The dispatch loop: execute stages and interpret transitions
    /// until the run reaches assembly, then route the terminal record.
    async fn drive(
        &self,
        mut state: RunState,
        start: Stage,
        cancel: &CancelToken,
    ) -> Result<VoterRecord, PipelineError> {
        let started = Instant::now();
        let mut stage = start;

        while stage != Stage::Assemble {
            let transition = if cancel.is_cancelled() {
                Transition::Fatal("run cancelled".to_string())
            } else {
                match self.handler(stage) {
                    Some(handler) => handler.execute(&mut state, cancel).await,
                    None => Transition::Fatal(format!("no handler for stage {stage}")),
                }
            };

            let next = match transition {
                Transition::Advance(next) => next,
                Transition::Retry(retry_stage) => {
                    retry::begin_attempt(&mut state, retry_stage);
                    retry_stage
                }
                Transition::Fatal(cause) => {
                    warn!(
                        record_id = %state.record_id,
                        %cause,
                        "fatal transition; assembling partial record"
                    );
                    state.errors.push(cause);
                    Stage::Assemble
                }
            };

            state.current_stage = next;
            self.write_checkpoint(&state, next).await;
            stage = next;
        }

        let aggregated = aggregate::aggregate(&state, &self.config);
        let record_id = state.record_id.clone();
        let mut record = assemble::assemble(state, aggregated);
        record.processing_duration_seconds = Some(started.elapsed().as_secs_f64());

        if record.needs_review {
            info!(
                record_id = %record.record_id,
                reasons = ?record.review_reasons,
                "record queued for review"
            );
            self.review_sink.enqueue(&record).await?;
        } else {
            info!(
                record_id = %record.record_id,
                confidence = record.overall_confidence,
                "record completed"
            );
        }

        // The record is already correctly produced; a cleanup failure
        // only costs resumability hygiene, never the run.
        if let Err(e) = self.checkpoints.delete(&record_id).await {
            warn!(%record_id, error = %e, "failed to delete checkpoint");
        }

        Ok(record)
    }

    async fn write_checkpoint(&self, state: &RunState, next_stage: Stage) {
        let checkpoint = Checkpoint::new(state.clone(), next_stage);
        if let Err(e) = self.checkpoints.save(&checkpoint).await {
            warn!(
                record_id = %state.record_id,
                error = %e,
                "checkpoint write failed; run continues without resumability"
            );
        }
    }
}
