//! Election stage
//!
//! Extracted elections pass a local validation independent of the
//! extractor's own confidence: years outside the plausible range are
//! rejected, ambiguous date strings are normalized against a fixed
//! list of accepted formats, missing jurisdictions are inferred from
//! the election type and year, and accepted entries get a confidence
//! floor. Rejections drop only the offending item.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use super::{extraction_failed, StageHandler};
use crate::extract::{Extractor, Facet, FacetRequest, FacetResponse};
use crate::model::{ElectionJurisdiction, ElectionType, ParsedElection};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::fields;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::state::{RunState, Stage, Transition};

/// Accepted input date formats, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Earliest election year considered plausible.
const MIN_ELECTION_YEAR: i32 = 1900;

/// Floor applied to the confidence of accepted elections.
const MIN_ELECTION_CONFIDENCE: f64 = 0.3;

/// Parses election participation history from the raw record.
pub struct ElectionStage {
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
}

impl ElectionStage {
    pub fn new(extractor: Arc<dyn Extractor>, retry: RetryPolicy) -> Self {
        Self { extractor, retry }
    }
}

#[async_trait]
impl StageHandler for ElectionStage {
    fn stage(&self) -> Stage {
        Stage::Election
    }

    async fn execute(&self, state: &mut RunState, cancel: &CancelToken) -> Transition {
        state.current_stage = Stage::Election;
        let limit = self.retry.limit_for(Stage::Election);

        let election_fields = fields::election_fields(&state.raw_record);
        if election_fields.is_empty() {
            debug!(record_id = %state.record_id, "no election fields present; empty success");
            state.record_score("elections", 1.0);
            return Transition::Advance(Stage::Assemble);
        }

        if cancel.is_cancelled() {
            return Transition::Fatal("run cancelled before election extraction".to_string());
        }

        let request = FacetRequest::new(Facet::Election, election_fields);
        match self.extractor.extract(request).await {
            Ok(FacetResponse::Election(extraction)) => {
                state.warnings.extend(extraction.parsing_errors);

                let validated = validate_elections(extraction.elections);
                state.errors.extend(validated.errors);

                info!(
                    record_id = %state.record_id,
                    count = validated.elections.len(),
                    years = ?validated.years_found,
                    "parsed elections"
                );
                if !validated.elections.is_empty() {
                    let mean = validated.elections.iter().map(|e| e.confidence).sum::<f64>()
                        / validated.elections.len() as f64;
                    state.record_score("elections", mean);
                }
                state.elections = validated.elections;
                Transition::Advance(Stage::Assemble)
            }
            Ok(other) => extraction_failed(
                state,
                Stage::Election,
                limit,
                &format!("unexpected {} response", other.facet()),
            ),
            Err(e) => extraction_failed(state, Stage::Election, limit, &e.to_string()),
        }
    }
}

/// Result of validating extracted elections.
struct ValidatedElections {
    elections: Vec<ParsedElection>,
    errors: Vec<String>,
    /// Distinct years across accepted elections, descending.
    years_found: Vec<i32>,
}

/// Validate and clean extracted elections.
///
/// Year range is `[1900, current_year + 4]`; out-of-range entries are
/// dropped with an error. Dates that fit none of the accepted formats
/// are cleared with an error while the entry itself is kept.
fn validate_elections(elections: Vec<ParsedElection>) -> ValidatedElections {
    let current_year = Utc::now().year();
    let mut errors = Vec::new();
    let mut years = BTreeSet::new();
    let mut kept = Vec::new();

    for mut election in elections {
        if let Some(year) = election.election_year {
            if year < MIN_ELECTION_YEAR || year > current_year + 4 {
                errors.push(format!("invalid election year: {year}"));
                continue;
            }
            years.insert(year);
        }

        if let Some(raw_date) = election.election_date.take() {
            match normalize_date(&raw_date) {
                Some(normalized) => election.election_date = Some(normalized),
                None => errors.push(format!("could not parse election date: {raw_date}")),
            }
        }

        if matches!(
            election.jurisdiction,
            None | Some(ElectionJurisdiction::Unknown)
        ) {
            if let Some(inferred) = infer_jurisdiction(&election) {
                election.jurisdiction = Some(inferred);
            }
        }

        if election.confidence < MIN_ELECTION_CONFIDENCE {
            election.confidence = MIN_ELECTION_CONFIDENCE;
        }

        kept.push(election);
    }

    let years_found: Vec<i32> = years.into_iter().rev().collect();
    ValidatedElections {
        elections: kept,
        errors,
        years_found,
    }
}

/// Normalize a date string to YYYY-MM-DD, trying each accepted format.
fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Infer a jurisdiction from election type and year.
///
/// General/primary elections in even years are federal cycles, odd
/// years state; municipal and school elections map to their own
/// jurisdictions.
fn infer_jurisdiction(election: &ParsedElection) -> Option<ElectionJurisdiction> {
    match election.election_type {
        ElectionType::General | ElectionType::Primary => {
            match election.election_year {
                Some(year) if year % 2 == 0 => Some(ElectionJurisdiction::Federal),
                _ => Some(ElectionJurisdiction::State),
            }
        }
        ElectionType::Municipal => Some(ElectionJurisdiction::Municipal),
        ElectionType::School => Some(ElectionJurisdiction::SchoolDistrict),
        _ => None,
    }
}
