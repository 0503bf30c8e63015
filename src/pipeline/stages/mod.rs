//! Stage handlers for the extraction pipeline
//!
//! Each handler owns one facet: it selects the relevant raw fields,
//! invokes the extractor, writes results and confidence into the run
//! state, and emits a [`Transition`] for the runner to interpret.
//!
//! Shared contract:
//! - an empty field subset is a no-op success recorded at confidence
//!   1.0 (an absent facet is not an error)
//! - extractor failure retries while the run's budget allows, then
//!   force-advances with the facet left empty

mod address;
mod district;
mod election;
mod name;

use async_trait::async_trait;
use tracing::warn;

use super::cancel::CancelToken;
use super::retry;
use super::state::{RunState, Stage, Transition};

pub use address::AddressStage;
pub use district::DistrictStage;
pub use election::ElectionStage;
pub use name::NameStage;

/// One node of the pipeline, responsible for one facet.
#[async_trait]
pub trait StageHandler: Send + Sync {
    /// Which stage this handler implements.
    fn stage(&self) -> Stage;

    /// Execute the stage against the run state.
    ///
    /// Handlers never abort the record: every failure surfaces as a
    /// `Retry` or a degraded `Advance`, and `Fatal` is reserved for
    /// cancellation.
    async fn execute(&self, state: &mut RunState, cancel: &CancelToken) -> Transition;
}

/// Shared failure path for extractor errors.
///
/// Retries while the run-global counter is below `limit`; once the
/// budget is spent, records the error and forces forward progress with
/// the facet left empty. The error entry is written only on the final
/// failure, so a stage that eventually succeeds leaves no error behind.
pub(crate) fn extraction_failed(
    state: &mut RunState,
    stage: Stage,
    limit: u32,
    cause: &str,
) -> Transition {
    if retry::should_retry(state, limit) {
        warn!(record_id = %state.record_id, stage = %stage, cause, "stage failed; retrying");
        Transition::Retry(stage)
    } else {
        warn!(
            record_id = %state.record_id,
            stage = %stage,
            cause,
            "retries exhausted; continuing with empty facet"
        );
        state
            .errors
            .push(format!("{} parsing failed: {}", stage.label(), cause));
        Transition::Advance(stage.successor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRecord;

    #[test]
    fn failure_below_limit_retries_without_error_entry() {
        let mut state = RunState::new("r", RawRecord::new());
        let transition = extraction_failed(&mut state, Stage::Name, 1, "boom");
        assert_eq!(transition, Transition::Retry(Stage::Name));
        assert!(state.errors.is_empty());
    }

    #[test]
    fn failure_at_limit_records_error_and_advances() {
        let mut state = RunState::new("r", RawRecord::new());
        state.retry_count = 1;
        let transition = extraction_failed(&mut state, Stage::Name, 1, "boom");
        assert_eq!(transition, Transition::Advance(Stage::Address));
        assert_eq!(state.errors, vec!["Name parsing failed: boom".to_string()]);
    }
}
