//! Confidence aggregation and review-reason composition
//!
//! Pure functions over run state: the overall confidence is the
//! arithmetic mean of the per-component scores, and review reasons are
//! evaluated independently in a fixed order so identical input always
//! produces identical reason ordering.

use super::config::PipelineConfig;
use super::state::RunState;

/// Aggregator output consumed by the assembler and review router.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Mean of the recorded confidence scores; 0.0 when none exist.
    pub overall_confidence: f64,
    /// All triggered review reasons, in evaluation order.
    pub review_reasons: Vec<String>,
}

/// Compute overall confidence and review reasons for a finished run.
pub fn aggregate(state: &RunState, config: &PipelineConfig) -> Aggregate {
    let overall_confidence = if state.confidence_scores.is_empty() {
        0.0
    } else {
        state.confidence_scores.values().sum::<f64>() / state.confidence_scores.len() as f64
    };

    let mut review_reasons = Vec::new();
    if overall_confidence < config.review_confidence_threshold {
        review_reasons.push(format!("low overall confidence: {overall_confidence:.2}"));
    }
    if state.errors.len() > config.max_error_count {
        review_reasons.push(format!("multiple processing errors: {}", state.errors.len()));
    }
    if state.name.is_none() {
        review_reasons.push("missing name information".to_string());
    }
    if state.mailing_address.is_none() && state.residence_address.is_none() {
        review_reasons.push("missing address information".to_string());
    }
    if state.districts.is_empty() {
        review_reasons.push("missing district information".to_string());
    }

    Aggregate {
        overall_confidence,
        review_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParsedName, RawRecord};

    fn state_with_scores(scores: &[(&str, f64)]) -> RunState {
        let mut state = RunState::new("r", RawRecord::new());
        for (key, value) in scores {
            state.record_score(*key, *value);
        }
        state
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new()
    }

    #[test]
    fn overall_confidence_is_mean_of_scores() {
        let state = state_with_scores(&[("name", 1.0), ("mailing_address", 0.9), ("districts", 1.0), ("elections", 1.0)]);
        let aggregate = aggregate(&state, &config());
        assert!((aggregate.overall_confidence - 0.975).abs() < 1e-9);
    }

    #[test]
    fn empty_score_map_yields_zero() {
        let state = state_with_scores(&[]);
        let result = aggregate(&state, &config());
        assert_eq!(result.overall_confidence, 0.0);
        // 0.0 < threshold, and every facet is missing
        assert!(result
            .review_reasons
            .iter()
            .any(|r| r.starts_with("low overall confidence")));
    }

    #[test]
    fn reasons_follow_fixed_order() {
        let mut state = state_with_scores(&[("name", 0.1)]);
        state.errors = vec!["a".into(), "b".into(), "c".into()];
        let result = aggregate(&state, &config());
        assert_eq!(result.review_reasons.len(), 5);
        assert!(result.review_reasons[0].starts_with("low overall confidence"));
        assert!(result.review_reasons[1].starts_with("multiple processing errors"));
        assert_eq!(result.review_reasons[2], "missing name information");
        assert_eq!(result.review_reasons[3], "missing address information");
        assert_eq!(result.review_reasons[4], "missing district information");
    }

    #[test]
    fn high_confidence_empty_record_still_flags_missing_facets() {
        // All facets empty no-ops: perfect numeric confidence, but the
        // completeness checks still route the record to review.
        let mut state =
            state_with_scores(&[("name", 1.0), ("address", 1.0), ("districts", 1.0), ("elections", 1.0)]);
        state.name = None;
        let result = aggregate(&state, &config());
        assert_eq!(result.overall_confidence, 1.0);
        assert_eq!(
            result.review_reasons,
            vec![
                "missing name information",
                "missing address information",
                "missing district information"
            ]
        );
    }

    #[test]
    fn present_facets_do_not_trigger_reasons() {
        let mut state = state_with_scores(&[("name", 0.95)]);
        state.name = Some(ParsedName {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            middle_name: None,
            suffix: None,
            date_of_birth: None,
            confidence: 0.95,
            raw_input: "Ada Lovelace".into(),
        });
        let result = aggregate(&state, &config());
        assert!(!result.review_reasons.contains(&"missing name information".to_string()));
    }
}
