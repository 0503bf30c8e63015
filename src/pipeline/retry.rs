//! Bounded retry for failed stages
//!
//! The retry counter is global to the run, not per-stage: the policy
//! bounds total retries spent on one record. A record that burns its
//! budget on an early stage force-advances on the next failure instead
//! of retrying. Retries are immediate re-invocations with no backoff;
//! failures here are data/formatting issues, not transient outages.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::state::{RunState, Stage};

/// Per-stage retry limits, each checked against the run-global counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub name: u32,
    pub address: u32,
    pub district: u32,
    pub election: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::uniform(3)
    }
}

impl RetryPolicy {
    /// The same limit for every stage.
    pub fn uniform(limit: u32) -> Self {
        Self {
            name: limit,
            address: limit,
            district: limit,
            election: limit,
        }
    }

    pub fn limit_for(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Name => self.name,
            Stage::Address => self.address,
            Stage::District => self.district,
            Stage::Election => self.election,
            Stage::Assemble => 0,
        }
    }
}

/// Whether the run may retry a stage with the given limit.
pub fn should_retry(state: &RunState, limit: u32) -> bool {
    state.retry_count < limit
}

/// Consume one retry: bump the counter and log the attempt number.
pub fn begin_attempt(state: &mut RunState, stage: Stage) {
    state.retry_count += 1;
    info!(
        record_id = %state.record_id,
        stage = %stage,
        attempt = state.retry_count,
        "retrying stage"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRecord;

    #[test]
    fn retry_allowed_strictly_below_limit() {
        let mut state = RunState::new("r", RawRecord::new());
        assert!(should_retry(&state, 1));
        state.retry_count = 1;
        assert!(!should_retry(&state, 1));
    }

    #[test]
    fn budget_is_shared_across_stages() {
        let mut state = RunState::new("r", RawRecord::new());
        begin_attempt(&mut state, Stage::Name);
        begin_attempt(&mut state, Stage::District);
        assert_eq!(state.retry_count, 2);
        assert!(!should_retry(&state, 2));
    }

    #[test]
    fn uniform_policy_applies_to_all_stages() {
        let policy = RetryPolicy::uniform(5);
        assert_eq!(policy.limit_for(Stage::Name), 5);
        assert_eq!(policy.limit_for(Stage::Election), 5);
        assert_eq!(policy.limit_for(Stage::Assemble), 0);
    }
}
