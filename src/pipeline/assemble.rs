//! Final record assembly
//!
//! Assembly never fails: a run whose every stage came up empty still
//! produces a record, flagged for review by the aggregator's reasons.

use chrono::Utc;

use super::aggregate::Aggregate;
use super::state::RunState;
use crate::model::VoterRecord;

/// Build the terminal record from run state and aggregator output.
pub fn assemble(state: RunState, aggregate: Aggregate) -> VoterRecord {
    let needs_review = !aggregate.review_reasons.is_empty();
    VoterRecord {
        record_id: state.record_id,
        original_record: Some(state.raw_record),
        name: state.name,
        mailing_address: state.mailing_address,
        residence_address: state.residence_address,
        districts: state.districts,
        elections: state.elections,
        confidence_scores: state.confidence_scores,
        overall_confidence: aggregate.overall_confidence,
        errors: state.errors,
        warnings: state.warnings,
        needs_review,
        review_reasons: aggregate.review_reasons,
        processed_at: Utc::now(),
        processing_duration_seconds: None,
        reviewed_by: None,
        review_timestamp: None,
        review_notes: None,
    }
}
