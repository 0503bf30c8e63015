//! Shared helpers for integration tests

use std::sync::Once;

use canvass::extract::FacetResponse;
use canvass::model::{
    AddressComponent, AddressExtraction, AddressField, AddressKind, DistrictExtraction,
    DistrictLevel, ElectionExtraction, ElectionType, ParsedDistrict, ParsedElection, ParsedName,
    RawRecord, VotingMethod,
};

/// Install a test subscriber once per binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Build a raw record from literal entries.
pub fn record(entries: &[(&str, serde_json::Value)]) -> RawRecord {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn name_response(first: &str, last: &str, confidence: f64) -> FacetResponse {
    FacetResponse::Name(ParsedName {
        first_name: first.to_string(),
        last_name: last.to_string(),
        middle_name: None,
        suffix: None,
        date_of_birth: None,
        confidence,
        raw_input: format!("{first} {last}"),
    })
}

/// Mailing-only classification of the classic two-field mailing record.
pub fn mailing_fields(confidence: f64) -> Vec<AddressField> {
    vec![
        AddressField {
            field_name: "mail_address1".to_string(),
            kind: AddressKind::Mailing,
            component: AddressComponent::Address1,
            value: "123 Main St".to_string(),
            confidence,
        },
        AddressField {
            field_name: "mail_city".to_string(),
            kind: AddressKind::Mailing,
            component: AddressComponent::City,
            value: "Austin".to_string(),
            confidence,
        },
    ]
}

pub fn mailing_response(confidence: f64) -> FacetResponse {
    FacetResponse::Address(AddressExtraction {
        mailing_fields: mailing_fields(confidence),
        ..Default::default()
    })
}

pub fn district_response(confidence: f64) -> FacetResponse {
    FacetResponse::District(DistrictExtraction {
        districts: vec![ParsedDistrict {
            field_name: "senate_district".to_string(),
            level: DistrictLevel::State,
            district_type: "senate".to_string(),
            number: Some("14".to_string()),
            value: "14".to_string(),
            confidence,
        }],
        ..Default::default()
    })
}

pub fn election_response(confidence: f64) -> FacetResponse {
    FacetResponse::Election(ElectionExtraction {
        elections: vec![ParsedElection {
            field_name: "vote_history".to_string(),
            election_date: Some("11/3/2020".to_string()),
            election_type: ElectionType::General,
            election_year: Some(2020),
            participated: true,
            voting_method: Some(VotingMethod::DayOf),
            jurisdiction: None,
            raw_value: "GEN 2020".to_string(),
            confidence,
        }],
        ..Default::default()
    })
}
