//! Terminal voter record produced by the assembler

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::ParsedAddress;
use super::district::ParsedDistrict;
use super::election::ParsedElection;
use super::name::ParsedName;

/// A raw input row: original field name → raw value.
///
/// Values are JSON so that pre-structured inputs (e.g. a `districts`
/// array) survive ingestion; most values are plain strings.
pub type RawRecord = BTreeMap<String, serde_json::Value>;

/// Final assembled voter record with all parsed components.
///
/// Immutable once produced; the sole externally visible artifact of a
/// run, including its failures. Invariant:
/// `needs_review == !review_reasons.is_empty()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterRecord {
    pub record_id: String,
    /// Original raw record, retained for audit.
    #[serde(default)]
    pub original_record: Option<RawRecord>,

    #[serde(default)]
    pub name: Option<ParsedName>,
    #[serde(default)]
    pub mailing_address: Option<ParsedAddress>,
    #[serde(default)]
    pub residence_address: Option<ParsedAddress>,
    #[serde(default)]
    pub districts: Vec<ParsedDistrict>,
    #[serde(default)]
    pub elections: Vec<ParsedElection>,

    /// Confidence score per component.
    #[serde(default)]
    pub confidence_scores: BTreeMap<String, f64>,
    /// Arithmetic mean of `confidence_scores`, 0.0 when empty.
    pub overall_confidence: f64,

    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,

    pub needs_review: bool,
    #[serde(default)]
    pub review_reasons: Vec<String>,

    pub processed_at: DateTime<Utc>,
    #[serde(default)]
    pub processing_duration_seconds: Option<f64>,

    // Review workflow metadata, filled in downstream of the pipeline.
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub review_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_notes: Option<String>,
}

impl VoterRecord {
    /// Synthetic record for a run that failed outside stage handling.
    ///
    /// Used by the batch driver so one poisoned record never aborts the
    /// batch; always review-flagged.
    pub fn failed(
        record_id: impl Into<String>,
        error: impl Into<String>,
        original_record: Option<RawRecord>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            original_record,
            name: None,
            mailing_address: None,
            residence_address: None,
            districts: Vec::new(),
            elections: Vec::new(),
            confidence_scores: BTreeMap::new(),
            overall_confidence: 0.0,
            errors: vec![error.into()],
            warnings: Vec::new(),
            needs_review: true,
            review_reasons: vec!["processing failed".to_string()],
            processed_at: Utc::now(),
            processing_duration_seconds: None,
            reviewed_by: None,
            review_timestamp: None,
            review_notes: None,
        }
    }

    /// Whether the record has the minimum required components.
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && (self.mailing_address.is_some() || self.residence_address.is_some())
            && !self.districts.is_empty()
    }

    /// Primary address: residence preferred, mailing as fallback.
    pub fn primary_address(&self) -> Option<&ParsedAddress> {
        self.residence_address.as_ref().or(self.mailing_address.as_ref())
    }

    /// Distinct years the voter participated in, descending.
    pub fn election_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .elections
            .iter()
            .filter(|e| e.participated)
            .filter_map(|e| e.election_year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years.reverse();
        years
    }

    /// Most recent election year the voter participated in.
    pub fn latest_election_year(&self) -> Option<i32> {
        self.election_years().first().copied()
    }

    /// District labels grouped by government level.
    pub fn district_summary(&self) -> BTreeMap<String, Vec<String>> {
        let mut summary: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for district in &self.districts {
            summary
                .entry(district.level.as_str().to_string())
                .or_default()
                .push(district.label());
        }
        summary
    }

    /// Compact reporting summary.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            record_id: self.record_id.clone(),
            name: self
                .name
                .as_ref()
                .map(|n| n.full_name())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            primary_address: self
                .primary_address()
                .map(|a| a.normalized())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            district_count: self.districts.len(),
            election_count: self.elections.iter().filter(|e| e.participated).count(),
            latest_election_year: self.latest_election_year(),
            overall_confidence: self.overall_confidence,
            needs_review: self.needs_review,
            is_complete: self.is_complete(),
            error_count: self.errors.len(),
        }
    }
}

/// One-line reporting view of a [`VoterRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub record_id: String,
    pub name: String,
    pub primary_address: String,
    pub district_count: usize,
    pub election_count: usize,
    pub latest_election_year: Option<i32>,
    pub overall_confidence: f64,
    pub needs_review: bool,
    pub is_complete: bool,
    pub error_count: usize,
}
