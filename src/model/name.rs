//! Parsed name facet

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parsed voter name with extraction confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedName {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Date of birth when the source record carries one.
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
    /// The raw text the extractor derived this name from.
    pub raw_input: String,
}

impl ParsedName {
    /// Display form: "First [Middle] Last[, Suffix]".
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.as_str()];
        if let Some(middle) = &self.middle_name {
            parts.push(middle.as_str());
        }
        parts.push(self.last_name.as_str());
        let mut full = parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(suffix) = &self.suffix {
            if !suffix.trim().is_empty() {
                full.push_str(", ");
                full.push_str(suffix);
            }
        }
        full
    }
}
