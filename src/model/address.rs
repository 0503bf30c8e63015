//! Address facet: per-field classification and assembled addresses
//!
//! The extractor classifies each raw address field into a mailing or
//! residence [`AddressField`]; [`ParsedAddress::from_fields`] folds one
//! kind's fields into a complete address whose confidence is the mean
//! of its field confidences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{AddressComponent, AddressKind};

/// A single raw field classified as one component of one address kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressField {
    /// Original field name from the source record.
    pub field_name: String,
    pub kind: AddressKind,
    pub component: AddressComponent,
    /// The actual value from the data.
    pub value: String,
    /// Extraction confidence in [0, 1].
    pub confidence: f64,
}

/// Complete parsed address for one kind (mailing or residence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip5: String,
    #[serde(default)]
    pub zip4: Option<String>,
    /// Mean confidence of the fields this address was built from.
    pub confidence: f64,
    /// The classified source fields, keyed by original field name.
    pub raw_input: String,
}

impl ParsedAddress {
    /// Fold classified fields into a complete address.
    ///
    /// Unrecognized components are ignored; confidence is the mean of
    /// all field confidences (0.0 for an empty slice).
    pub fn from_fields(fields: &[AddressField]) -> Self {
        let mut components: BTreeMap<&'static str, &str> = BTreeMap::new();
        for field in fields {
            components.insert(field.component.as_str(), field.value.as_str());
        }

        let raw: BTreeMap<&str, &str> = fields
            .iter()
            .map(|f| (f.field_name.as_str(), f.value.as_str()))
            .collect();

        Self {
            address1: components.get("address1").unwrap_or(&"").to_string(),
            address2: components.get("address2").map(|s| s.to_string()),
            city: components.get("city").unwrap_or(&"").to_string(),
            state: components.get("state").unwrap_or(&"").to_string(),
            zip5: components.get("zip5").unwrap_or(&"").to_string(),
            zip4: components.get("zip4").map(|s| s.to_string()),
            confidence: mean_confidence(fields),
            raw_input: serde_json::to_string(&raw).unwrap_or_default(),
        }
    }

    /// Normalized single-line form: "address1, address2, city, state, zip".
    pub fn normalized(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for part in [
            Some(self.address1.as_str()),
            self.address2.as_deref(),
            Some(self.city.as_str()),
            Some(self.state.as_str()),
        ]
        .into_iter()
        .flatten()
        {
            if !part.trim().is_empty() {
                parts.push(part.to_string());
            }
        }
        if !self.zip5.is_empty() {
            let zip = match &self.zip4 {
                Some(zip4) if !zip4.is_empty() => format!("{}-{}", self.zip5, zip4),
                _ => self.zip5.clone(),
            };
            parts.push(zip);
        }
        parts.join(", ")
    }
}

/// Mean field confidence, 0.0 for an empty slice.
pub fn mean_confidence(fields: &[AddressField]) -> f64 {
    if fields.is_empty() {
        return 0.0;
    }
    fields.iter().map(|f| f.confidence).sum::<f64>() / fields.len() as f64
}

/// Extractor response for the address facet.
///
/// Either, both, or neither kind may have classified fields; absence of
/// one kind is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressExtraction {
    #[serde(default)]
    pub mailing_fields: Vec<AddressField>,
    #[serde(default)]
    pub residence_fields: Vec<AddressField>,
    #[serde(default)]
    pub parsing_errors: Vec<String>,
    #[serde(default)]
    pub total_fields_processed: usize,
    #[serde(default)]
    pub successfully_parsed: usize,
}
