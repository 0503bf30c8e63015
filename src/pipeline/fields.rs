//! Facet field classification
//!
//! Each stage selects its relevant subset of the raw record by
//! case-insensitive substring matching against a fixed pattern set, the
//! way inconsistently-named voter-file exports are actually keyed.
//! Election fields additionally match on a year in the field name, or a
//! date-shaped value under a numbered field name.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::model::RawRecord;

const NAME_PATTERNS: &[&str] = &[
    "first_name",
    "last_name",
    "middle_name",
    "name_first",
    "name_last",
];

// Matched against the uppercased field name; covers the common mailing
// and residence prefixes plus the abbreviated state-export spellings.
const ADDRESS_PATTERNS: &[&str] = &[
    "MAIL_",
    "RESIDENCE_",
    "MAILING",
    "RESIDENTIAL",
    "ADDRESS",
    "MLCITY",
    "RCITY",
    "RZIP",
    "MZIP",
    "RA_",
    "MA_",
    "MLADD",
    "MADR",
    "STRNAM",
    "HOUSENUMBER",
];

const DISTRICT_PATTERNS: &[&str] = &[
    "district_",
    "dist_",
    "legislative_",
    "congress",
    "senate",
    "house",
    "school_",
    "municipal_",
    "county_",
    "court_",
    "precinct",
    "ward",
    "beat",
    "council",
    "commissioner",
];

const ELECTION_PATTERNS: &[&str] = &[
    "election_",
    "vote_",
    "voted_",
    "elec_",
    "history_",
    "general",
    "primary",
    "special",
    "municipal",
    "school",
    "gen",
    "pri",
    "prir",
    "sp",
    "mun",
    "runoff",
];

fn year_in_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(19|20)\d{2}").unwrap())
}

fn numbered_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").unwrap())
}

fn date_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{1,2}[/_-]\d{1,2}[/_-]\d{4}").unwrap())
}

/// Stringify a raw value for the extractor; `None` when empty.
fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        other => Some(other.to_string()),
    }
}

fn matching_fields(
    record: &RawRecord,
    matches: impl Fn(&str, &str) -> bool,
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for (field_name, value) in record {
        let Some(text) = value_text(value) else {
            continue;
        };
        if matches(field_name, &text) {
            fields.insert(field_name.clone(), text);
        }
    }
    fields
}

/// Fields relevant to the name facet.
pub fn name_fields(record: &RawRecord) -> BTreeMap<String, String> {
    matching_fields(record, |field_name, _| {
        let lower = field_name.to_lowercase();
        NAME_PATTERNS.iter().any(|p| lower.contains(p))
    })
}

/// Fields relevant to the address facet (mailing and residence alike).
pub fn address_fields(record: &RawRecord) -> BTreeMap<String, String> {
    matching_fields(record, |field_name, _| {
        let upper = field_name.to_uppercase();
        ADDRESS_PATTERNS.iter().any(|p| upper.contains(p))
    })
}

/// Fields relevant to the district facet.
pub fn district_fields(record: &RawRecord) -> BTreeMap<String, String> {
    matching_fields(record, |field_name, _| {
        let lower = field_name.to_lowercase();
        DISTRICT_PATTERNS.iter().any(|p| lower.contains(p))
    })
}

/// Fields relevant to the election facet.
pub fn election_fields(record: &RawRecord) -> BTreeMap<String, String> {
    matching_fields(record, |field_name, text| {
        let lower = field_name.to_lowercase();
        if ELECTION_PATTERNS.iter().any(|p| lower.contains(p)) {
            return true;
        }
        // "2020_11_03"-style history columns
        if year_in_name_re().is_match(&lower) {
            return true;
        }
        // Numbered columns holding a date-shaped value
        numbered_name_re().is_match(&lower) && date_value_re().is_match(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(entries: &[(&str, serde_json::Value)]) -> RawRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn name_fields_match_known_column_spellings() {
        let record = record(&[
            ("first_name", json!("Ada")),
            ("NAME_LAST", json!("Lovelace")),
            ("mail_city", json!("Austin")),
        ]);
        let fields = name_fields(&record);
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("NAME_LAST"));
    }

    #[test]
    fn address_fields_match_prefixes_case_insensitively() {
        let record = record(&[
            ("mail_address1", json!("123 Main St")),
            ("RESIDENCE_CITY", json!("Austin")),
            ("rzip", json!("78701")),
            ("first_name", json!("Ada")),
        ]);
        let fields = address_fields(&record);
        assert_eq!(fields.len(), 3);
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn district_fields_match_type_substrings() {
        let record = record(&[
            ("congressional_district", json!("35")),
            ("precinct", json!("402")),
            ("mail_city", json!("Austin")),
        ]);
        let fields = district_fields(&record);
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn election_fields_match_keywords_and_year_names() {
        let record = record(&[
            ("vote_history", json!("GEN 2020")),
            ("2022_general", json!("Y")),
            ("col_1234", json!("11/3/2020")),
            ("col_5678", json!("not a date")),
            ("mail_city", json!("Austin")),
        ]);
        let fields = election_fields(&record);
        assert!(fields.contains_key("vote_history"));
        assert!(fields.contains_key("2022_general"));
        assert!(fields.contains_key("col_1234"));
        assert!(!fields.contains_key("col_5678"));
        assert!(!fields.contains_key("mail_city"));
    }

    #[test]
    fn empty_and_null_values_are_skipped() {
        let record = record(&[
            ("first_name", json!("  ")),
            ("last_name", json!(null)),
            ("name_last", json!("Lovelace")),
        ]);
        let fields = name_fields(&record);
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("name_last"));
    }

    #[test]
    fn non_string_values_are_stringified() {
        let record = record(&[("precinct", json!(402))]);
        let fields = district_fields(&record);
        assert_eq!(fields["precinct"], "402");
    }
}
