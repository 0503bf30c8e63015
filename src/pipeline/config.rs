//! Pipeline configuration

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-stage retry limits (checked against the run-global counter).
    pub retry: RetryPolicy,
    /// Overall confidence below which a record is flagged for review.
    pub review_confidence_threshold: f64,
    /// Error count above which a record is flagged for review.
    pub max_error_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            review_confidence_threshold: 0.7,
            max_error_count: 2,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_review_threshold(mut self, threshold: f64) -> Self {
        self.review_confidence_threshold = threshold;
        self
    }

    pub fn with_max_error_count(mut self, count: usize) -> Self {
        self.max_error_count = count;
        self
    }
}
