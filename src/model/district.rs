//! District facet

use serde::{Deserialize, Serialize};

use super::enums::DistrictLevel;

/// Parsed legislative/administrative district information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDistrict {
    /// Original field name from the source record.
    pub field_name: String,
    pub level: DistrictLevel,
    /// Type of district (congressional, senate, school, ...).
    pub district_type: String,
    /// District number/identifier if present.
    #[serde(default)]
    pub number: Option<String>,
    /// The actual value from the data.
    pub value: String,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
}

impl ParsedDistrict {
    /// "type [number]" label used in per-level summaries.
    pub fn label(&self) -> String {
        match &self.number {
            Some(number) => format!("{} {}", self.district_type, number),
            None => self.district_type.clone(),
        }
    }
}

/// Extractor response for the district facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistrictExtraction {
    #[serde(default)]
    pub districts: Vec<ParsedDistrict>,
    #[serde(default)]
    pub parsing_errors: Vec<String>,
    #[serde(default)]
    pub total_fields_processed: usize,
    #[serde(default)]
    pub successfully_parsed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_number_when_present() {
        let district = ParsedDistrict {
            field_name: "congressional_district".to_string(),
            level: DistrictLevel::Federal,
            district_type: "congressional".to_string(),
            number: Some("35".to_string()),
            value: "35".to_string(),
            confidence: 0.9,
        };
        assert_eq!(district.label(), "congressional 35");

        let unnumbered = ParsedDistrict { number: None, ..district };
        assert_eq!(unnumbered.label(), "congressional");
    }
}
