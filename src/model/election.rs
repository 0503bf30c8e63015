//! Election participation facet

use serde::{Deserialize, Serialize};

use super::enums::{ElectionJurisdiction, ElectionType, VotingMethod};

/// One parsed election participation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedElection {
    /// Original field name from the source record.
    pub field_name: String,
    /// Election date, normalized to YYYY-MM-DD when parseable.
    #[serde(default)]
    pub election_date: Option<String>,
    pub election_type: ElectionType,
    #[serde(default)]
    pub election_year: Option<i32>,
    /// Whether the voter participated.
    pub participated: bool,
    #[serde(default)]
    pub voting_method: Option<VotingMethod>,
    #[serde(default)]
    pub jurisdiction: Option<ElectionJurisdiction>,
    /// Original raw value from the data.
    pub raw_value: String,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
}

/// Extractor response for the election facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectionExtraction {
    #[serde(default)]
    pub elections: Vec<ParsedElection>,
    #[serde(default)]
    pub parsing_errors: Vec<String>,
    #[serde(default)]
    pub total_fields_processed: usize,
    #[serde(default)]
    pub successfully_parsed: usize,
    /// Distinct years seen across parsed elections, descending.
    #[serde(default)]
    pub election_years_found: Vec<i32>,
}
