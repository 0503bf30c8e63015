//! Name stage

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{extraction_failed, StageHandler};
use crate::extract::{Extractor, Facet, FacetRequest, FacetResponse};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::fields;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::state::{RunState, Stage, Transition};

/// Parses the voter name from the raw record.
pub struct NameStage {
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
}

impl NameStage {
    pub fn new(extractor: Arc<dyn Extractor>, retry: RetryPolicy) -> Self {
        Self { extractor, retry }
    }
}

#[async_trait]
impl StageHandler for NameStage {
    fn stage(&self) -> Stage {
        Stage::Name
    }

    async fn execute(&self, state: &mut RunState, cancel: &CancelToken) -> Transition {
        state.current_stage = Stage::Name;
        let limit = self.retry.limit_for(Stage::Name);

        let name_fields = fields::name_fields(&state.raw_record);
        if name_fields.is_empty() {
            debug!(record_id = %state.record_id, "no name fields present; empty success");
            state.record_score("name", 1.0);
            return Transition::Advance(Stage::Address);
        }

        if cancel.is_cancelled() {
            return Transition::Fatal("run cancelled before name extraction".to_string());
        }

        let request = FacetRequest::new(Facet::Name, name_fields);
        match self.extractor.extract(request).await {
            Ok(FacetResponse::Name(name)) => {
                info!(
                    record_id = %state.record_id,
                    name = %name.full_name(),
                    confidence = name.confidence,
                    "parsed name"
                );
                state.record_score("name", name.confidence);
                state.name = Some(name);
                Transition::Advance(Stage::Address)
            }
            Ok(other) => extraction_failed(
                state,
                Stage::Name,
                limit,
                &format!("unexpected {} response", other.facet()),
            ),
            Err(e) => extraction_failed(state, Stage::Name, limit, &e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, MockExtractor};
    use crate::model::{ParsedName, RawRecord};
    use serde_json::json;

    fn record_with_name() -> RawRecord {
        let mut record = RawRecord::new();
        record.insert("first_name".to_string(), json!("Ada"));
        record.insert("last_name".to_string(), json!("Lovelace"));
        record
    }

    fn parsed_name() -> ParsedName {
        ParsedName {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            middle_name: None,
            suffix: None,
            date_of_birth: None,
            confidence: 0.92,
            raw_input: "Ada Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_subset_is_noop_success() {
        let mock = Arc::new(MockExtractor::new());
        let stage = NameStage::new(mock.clone(), RetryPolicy::default());
        let mut state = RunState::new("r", RawRecord::new());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::Address));
        assert_eq!(state.confidence_scores["name"], 1.0);
        assert!(state.name.is_none());
        assert!(state.errors.is_empty());
        assert_eq!(mock.calls_for(Facet::Name), 0);
    }

    #[tokio::test]
    async fn success_records_name_and_confidence() {
        let mock = Arc::new(MockExtractor::new().with_response(FacetResponse::Name(parsed_name())));
        let stage = NameStage::new(mock, RetryPolicy::default());
        let mut state = RunState::new("r", record_with_name());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::Address));
        assert_eq!(state.name.as_ref().unwrap().first_name, "Ada");
        assert!((state.confidence_scores["name"] - 0.92).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failure_retries_then_gives_up() {
        let mock = Arc::new(
            MockExtractor::new().with_failure(Facet::Name, ExtractError::Failed("down".into())),
        );
        let stage = NameStage::new(mock, RetryPolicy::uniform(1));
        let mut state = RunState::new("r", record_with_name());

        let first = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(first, Transition::Retry(Stage::Name));
        assert!(state.errors.is_empty());

        state.retry_count = 1;
        let second = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(second, Transition::Advance(Stage::Address));
        assert_eq!(state.errors.len(), 1);
        assert!(state.errors[0].starts_with("Name parsing failed:"));
        assert!(state.name.is_none());
        assert!(!state.confidence_scores.contains_key("name"));
    }

    #[tokio::test]
    async fn wrong_facet_response_is_a_failure() {
        let mock = Arc::new(MockExtractor::new().with_scripted(
            Facet::Name,
            Ok(FacetResponse::District(Default::default())),
        ));
        let stage = NameStage::new(mock, RetryPolicy::uniform(0));
        let mut state = RunState::new("r", record_with_name());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::Address));
        assert_eq!(state.errors.len(), 1);
        assert!(state.errors[0].contains("unexpected district response"));
    }

    #[tokio::test]
    async fn cancelled_run_is_fatal_before_extraction() {
        let mock = Arc::new(MockExtractor::new().with_response(FacetResponse::Name(parsed_name())));
        let stage = NameStage::new(mock.clone(), RetryPolicy::default());
        let mut state = RunState::new("r", record_with_name());

        let cancel = CancelToken::new();
        cancel.cancel();
        let transition = stage.execute(&mut state, &cancel).await;
        assert!(matches!(transition, Transition::Fatal(_)));
        assert_eq!(mock.calls_for(Facet::Name), 0);
    }
}
