//! Batch driver
//!
//! Feeds raw records through the runner strictly sequentially — the
//! checkpoint store's file-per-record scheme is safe under sequential
//! access — and isolates per-record failures so one poisoned record
//! never aborts the batch. Output order always matches input order.

use tracing::{error, info};

use super::runner::{Orchestrator, PipelineError};
use crate::model::{RawRecord, VoterRecord};

/// Processes batches of raw records, one terminal record per input.
pub struct BatchDriver {
    orchestrator: Orchestrator,
}

impl BatchDriver {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Process all records, returning exactly one terminal record per
    /// input in input order.
    ///
    /// A run failing outside stage-level handling yields a synthetic
    /// review-flagged record in its slot instead of aborting the batch.
    pub async fn process(&self, records: Vec<RawRecord>) -> Vec<VoterRecord> {
        let total = records.len();
        info!(total, "processing batch");

        let mut results = Vec::with_capacity(total);
        for (index, record) in records.into_iter().enumerate() {
            let record_id = format!("record_{index:06}");
            match self.orchestrator.run(&record_id, record.clone()).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(%record_id, error = %e, "record failed outside stage handling");
                    results.push(VoterRecord::failed(
                        &record_id,
                        format!("graph execution failed: {e}"),
                        Some(record),
                    ));
                }
            }
        }

        let flagged = results.iter().filter(|r| r.needs_review).count();
        info!(total, flagged, "batch complete");
        results
    }

    /// Resume one interrupted record by id.
    pub async fn resume(&self, record_id: &str) -> Result<VoterRecord, PipelineError> {
        self.orchestrator.resume(record_id).await
    }
}
