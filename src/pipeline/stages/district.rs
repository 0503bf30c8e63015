//! District stage
//!
//! Some upstream exports deliver districts pre-structured as a JSON
//! array under a `districts` field; those are converted directly at a
//! fixed high confidence without an extractor call. Everything else
//! goes through field classification and the extractor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{extraction_failed, StageHandler};
use crate::extract::{Extractor, Facet, FacetRequest, FacetResponse};
use crate::model::{DistrictLevel, ParsedDistrict};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::fields;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::state::{RunState, Stage, Transition};

/// Confidence assigned to districts that arrive pre-structured.
const STRUCTURED_DISTRICT_CONFIDENCE: f64 = 0.95;

/// Parses legislative/administrative districts from the raw record.
pub struct DistrictStage {
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
}

impl DistrictStage {
    pub fn new(extractor: Arc<dyn Extractor>, retry: RetryPolicy) -> Self {
        Self { extractor, retry }
    }

    fn record_districts(state: &mut RunState, districts: Vec<ParsedDistrict>) {
        if !districts.is_empty() {
            let mean =
                districts.iter().map(|d| d.confidence).sum::<f64>() / districts.len() as f64;
            state.record_score("districts", mean);
        }
        state.districts = districts;
    }
}

#[async_trait]
impl StageHandler for DistrictStage {
    fn stage(&self) -> Stage {
        Stage::District
    }

    async fn execute(&self, state: &mut RunState, cancel: &CancelToken) -> Transition {
        state.current_stage = Stage::District;
        let limit = self.retry.limit_for(Stage::District);

        // Pre-structured districts bypass the extractor entirely.
        if let Some(serde_json::Value::Array(items)) = state.raw_record.get("districts") {
            let items = items.clone();
            let districts = structured_districts(&items, &mut state.warnings);
            info!(
                record_id = %state.record_id,
                count = districts.len(),
                "converted pre-structured districts"
            );
            Self::record_districts(state, districts);
            return Transition::Advance(Stage::Election);
        }

        let district_fields = fields::district_fields(&state.raw_record);
        if district_fields.is_empty() {
            debug!(record_id = %state.record_id, "no district fields present; empty success");
            state.record_score("districts", 1.0);
            return Transition::Advance(Stage::Election);
        }

        if cancel.is_cancelled() {
            return Transition::Fatal("run cancelled before district extraction".to_string());
        }

        let request = FacetRequest::new(Facet::District, district_fields);
        match self.extractor.extract(request).await {
            Ok(FacetResponse::District(extraction)) => {
                state.warnings.extend(extraction.parsing_errors);
                info!(
                    record_id = %state.record_id,
                    count = extraction.districts.len(),
                    "parsed districts"
                );
                Self::record_districts(state, extraction.districts);
                Transition::Advance(Stage::Election)
            }
            Ok(other) => extraction_failed(
                state,
                Stage::District,
                limit,
                &format!("unexpected {} response", other.facet()),
            ),
            Err(e) => extraction_failed(state, Stage::District, limit, &e.to_string()),
        }
    }
}

/// Convert a pre-structured district array, warning on entries that
/// can't be interpreted.
fn structured_districts(
    items: &[serde_json::Value],
    warnings: &mut Vec<String>,
) -> Vec<ParsedDistrict> {
    let mut districts = Vec::new();
    for item in items {
        let Some(entry) = item.as_object() else {
            warnings.push(format!("skipped non-object district entry: {item}"));
            continue;
        };
        let level_text = entry
            .get("district_level")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let Some(level) = DistrictLevel::parse(level_text) else {
            warnings.push(format!(
                "skipped district with unrecognized level '{level_text}'"
            ));
            continue;
        };
        districts.push(ParsedDistrict {
            field_name: "districts".to_string(),
            level,
            district_type: entry
                .get("district_name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            number: entry.get("district_number").and_then(value_as_text),
            value: item.to_string(),
            confidence: STRUCTURED_DISTRICT_CONFIDENCE,
        });
    }
    districts
}

fn value_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MockExtractor;
    use crate::model::{DistrictExtraction, RawRecord};
    use serde_json::json;

    fn parsed_district(district_type: &str, confidence: f64) -> ParsedDistrict {
        ParsedDistrict {
            field_name: district_type.to_string(),
            level: DistrictLevel::State,
            district_type: district_type.to_string(),
            number: None,
            value: "x".to_string(),
            confidence,
        }
    }

    #[tokio::test]
    async fn empty_subset_is_noop_success() {
        let mock = Arc::new(MockExtractor::new());
        let stage = DistrictStage::new(mock, RetryPolicy::default());
        let mut state = RunState::new("r", RawRecord::new());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::Election));
        assert_eq!(state.confidence_scores["districts"], 1.0);
        assert!(state.districts.is_empty());
    }

    #[tokio::test]
    async fn structured_districts_bypass_extractor() {
        let mock = Arc::new(MockExtractor::new());
        let stage = DistrictStage::new(mock.clone(), RetryPolicy::default());

        let mut record = RawRecord::new();
        record.insert(
            "districts".to_string(),
            json!([
                {"district_level": "federal", "district_name": "congressional", "district_number": 35},
                {"district_level": "orbital", "district_name": "unknown"},
            ]),
        );
        let mut state = RunState::new("r", record);

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::Election));
        assert_eq!(mock.calls_for(Facet::District), 0);

        assert_eq!(state.districts.len(), 1);
        let district = &state.districts[0];
        assert_eq!(district.level, DistrictLevel::Federal);
        assert_eq!(district.number.as_deref(), Some("35"));
        assert!((state.confidence_scores["districts"] - 0.95).abs() < 1e-9);
        assert_eq!(state.warnings.len(), 1);
    }

    #[tokio::test]
    async fn extracted_districts_record_mean_confidence() {
        let extraction = DistrictExtraction {
            districts: vec![parsed_district("senate", 0.8), parsed_district("house", 0.6)],
            ..Default::default()
        };
        let mock =
            Arc::new(MockExtractor::new().with_response(FacetResponse::District(extraction)));
        let stage = DistrictStage::new(mock, RetryPolicy::default());

        let mut record = RawRecord::new();
        record.insert("senate_district".to_string(), json!("14"));
        let mut state = RunState::new("r", record);

        stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(state.districts.len(), 2);
        assert!((state.confidence_scores["districts"] - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_extraction_on_nonempty_input_records_no_score() {
        let mock = Arc::new(
            MockExtractor::new().with_response(FacetResponse::District(Default::default())),
        );
        let stage = DistrictStage::new(mock, RetryPolicy::default());

        let mut record = RawRecord::new();
        record.insert("precinct".to_string(), json!("402"));
        let mut state = RunState::new("r", record);

        stage.execute(&mut state, &CancelToken::new()).await;
        assert!(state.districts.is_empty());
        assert!(!state.confidence_scores.contains_key("districts"));
    }
}
