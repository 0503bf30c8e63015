//! Address stage
//!
//! Evaluates mailing and residence subsets independently: either, both,
//! or neither may be present in the raw record. Confidence is recorded
//! per sub-type as the mean confidence of the fields the extractor
//! classified under it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{extraction_failed, StageHandler};
use crate::extract::{Extractor, Facet, FacetRequest, FacetResponse};
use crate::model::{mean_confidence, ParsedAddress};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::fields;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::state::{RunState, Stage, Transition};

/// Parses mailing and residence addresses from the raw record.
pub struct AddressStage {
    extractor: Arc<dyn Extractor>,
    retry: RetryPolicy,
}

impl AddressStage {
    pub fn new(extractor: Arc<dyn Extractor>, retry: RetryPolicy) -> Self {
        Self { extractor, retry }
    }
}

#[async_trait]
impl StageHandler for AddressStage {
    fn stage(&self) -> Stage {
        Stage::Address
    }

    async fn execute(&self, state: &mut RunState, cancel: &CancelToken) -> Transition {
        state.current_stage = Stage::Address;
        let limit = self.retry.limit_for(Stage::Address);

        let address_fields = fields::address_fields(&state.raw_record);
        if address_fields.is_empty() {
            debug!(record_id = %state.record_id, "no address fields present; empty success");
            state.record_score("address", 1.0);
            return Transition::Advance(Stage::District);
        }

        if cancel.is_cancelled() {
            return Transition::Fatal("run cancelled before address extraction".to_string());
        }

        let request = FacetRequest::new(Facet::Address, address_fields);
        match self.extractor.extract(request).await {
            Ok(FacetResponse::Address(extraction)) => {
                state.warnings.extend(extraction.parsing_errors);

                if !extraction.mailing_fields.is_empty() {
                    state.record_score(
                        "mailing_address",
                        mean_confidence(&extraction.mailing_fields),
                    );
                    state.mailing_address =
                        Some(ParsedAddress::from_fields(&extraction.mailing_fields));
                }
                if !extraction.residence_fields.is_empty() {
                    state.record_score(
                        "residence_address",
                        mean_confidence(&extraction.residence_fields),
                    );
                    state.residence_address =
                        Some(ParsedAddress::from_fields(&extraction.residence_fields));
                }

                info!(
                    record_id = %state.record_id,
                    mailing = state.mailing_address.is_some(),
                    residence = state.residence_address.is_some(),
                    "parsed addresses"
                );
                Transition::Advance(Stage::District)
            }
            Ok(other) => extraction_failed(
                state,
                Stage::Address,
                limit,
                &format!("unexpected {} response", other.facet()),
            ),
            Err(e) => extraction_failed(state, Stage::Address, limit, &e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, MockExtractor};
    use crate::model::{AddressComponent, AddressExtraction, AddressField, AddressKind, RawRecord};
    use serde_json::json;

    fn record_with_mailing() -> RawRecord {
        let mut record = RawRecord::new();
        record.insert("mail_address1".to_string(), json!("123 Main St"));
        record.insert("mail_city".to_string(), json!("Austin"));
        record
    }

    fn mailing_field(name: &str, component: AddressComponent, value: &str, confidence: f64) -> AddressField {
        AddressField {
            field_name: name.to_string(),
            kind: AddressKind::Mailing,
            component,
            value: value.to_string(),
            confidence,
        }
    }

    #[tokio::test]
    async fn empty_subset_is_noop_success() {
        let mock = Arc::new(MockExtractor::new());
        let stage = AddressStage::new(mock, RetryPolicy::default());
        let mut state = RunState::new("r", RawRecord::new());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::District));
        assert_eq!(state.confidence_scores["address"], 1.0);
        assert!(state.mailing_address.is_none());
        assert!(state.residence_address.is_none());
    }

    #[tokio::test]
    async fn mailing_only_records_one_subtype_score() {
        let extraction = AddressExtraction {
            mailing_fields: vec![
                mailing_field("mail_address1", AddressComponent::Address1, "123 Main St", 0.9),
                mailing_field("mail_city", AddressComponent::City, "Austin", 0.9),
            ],
            ..Default::default()
        };
        let mock =
            Arc::new(MockExtractor::new().with_response(FacetResponse::Address(extraction)));
        let stage = AddressStage::new(mock, RetryPolicy::default());
        let mut state = RunState::new("r", record_with_mailing());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::District));

        let mailing = state.mailing_address.as_ref().unwrap();
        assert_eq!(mailing.address1, "123 Main St");
        assert_eq!(mailing.city, "Austin");
        assert!((state.confidence_scores["mailing_address"] - 0.9).abs() < 1e-9);
        assert!(state.residence_address.is_none());
        assert!(!state.confidence_scores.contains_key("residence_address"));
    }

    #[tokio::test]
    async fn extractor_parsing_errors_become_warnings() {
        let extraction = AddressExtraction {
            parsing_errors: vec!["ambiguous field RZIP".to_string()],
            ..Default::default()
        };
        let mock =
            Arc::new(MockExtractor::new().with_response(FacetResponse::Address(extraction)));
        let stage = AddressStage::new(mock, RetryPolicy::default());
        let mut state = RunState::new("r", record_with_mailing());

        stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(state.warnings, vec!["ambiguous field RZIP".to_string()]);
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn exhausted_failure_leaves_both_addresses_empty() {
        let mock = Arc::new(
            MockExtractor::new().with_failure(Facet::Address, ExtractError::Failed("down".into())),
        );
        let stage = AddressStage::new(mock, RetryPolicy::uniform(0));
        let mut state = RunState::new("r", record_with_mailing());

        let transition = stage.execute(&mut state, &CancelToken::new()).await;
        assert_eq!(transition, Transition::Advance(Stage::District));
        assert!(state.errors[0].starts_with("Address parsing failed:"));
        assert!(state.mailing_address.is_none());
        assert!(state.residence_address.is_none());
    }
}
