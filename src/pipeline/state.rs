//! Run state and state-machine vocabulary
//!
//! One [`RunState`] exists per record run and is owned exclusively by
//! that run. Stage handlers mutate it and emit a [`Transition`]; the
//! runner interprets transitions in a central dispatch loop, so no
//! handler ever needs to know how the next stage is reached.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ParsedAddress, ParsedDistrict, ParsedElection, ParsedName, RawRecord};

/// Stages of the pipeline, in fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Name,
    Address,
    District,
    Election,
    Assemble,
}

impl Stage {
    /// The stage that follows this one in pipeline order.
    pub fn successor(self) -> Stage {
        match self {
            Stage::Name => Stage::Address,
            Stage::Address => Stage::District,
            Stage::District => Stage::Election,
            Stage::Election => Stage::Assemble,
            Stage::Assemble => Stage::Assemble,
        }
    }

    /// Capitalized label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Name => "Name",
            Stage::Address => "Address",
            Stage::District => "District",
            Stage::Election => "Election",
            Stage::Assemble => "Assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one stage execution, interpreted by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Stage finished (possibly degraded); continue at the given stage.
    Advance(Stage),
    /// Stage failed and the retry budget allows another attempt.
    Retry(Stage),
    /// Unrecoverable condition; record the cause and go assemble what
    /// exists so far.
    Fatal(String),
}

/// Mutable state for one record run.
///
/// Owned exclusively by one runner invocation; checkpointed after every
/// transition so an interrupted run resumes from its last completed
/// stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub record_id: String,
    /// Original input row; never mutated after run start.
    pub raw_record: RawRecord,

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

    /// Error messages accumulated across stages; never cleared.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Non-fatal notices (extractor parsing errors, dropped items).
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Total retries spent so far, shared across stages.
    #[serde(default)]
    pub retry_count: u32,
    /// Confidence per component, keyed by score name.
    #[serde(default)]
    pub confidence_scores: BTreeMap<String, f64>,
    /// Active or last-attempted stage.
    pub current_stage: Stage,
}

impl RunState {
    pub fn new(record_id: impl Into<String>, raw_record: RawRecord) -> Self {
        Self {
            record_id: record_id.into(),
            raw_record,
            name: None,
            mailing_address: None,
            residence_address: None,
            districts: Vec::new(),
            elections: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            retry_count: 0,
            confidence_scores: BTreeMap::new(),
            current_stage: Stage::Name,
        }
    }

    /// Record a component confidence score.
    pub fn record_score(&mut self, key: impl Into<String>, confidence: f64) {
        self.confidence_scores.insert(key.into(), confidence);
    }
}
