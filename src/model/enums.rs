//! Enumeration types shared across facet models

use serde::{Deserialize, Serialize};

/// Whether an address field belongs to the mailing or residence address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    Mailing,
    Residence,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Mailing => "mailing",
            AddressKind::Residence => "residence",
        }
    }
}

/// Address component an individual source field maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressComponent {
    Address1,
    Address2,
    City,
    State,
    Zip5,
    Zip4,
    Country,
    // Granular residence components some states export
    HouseNumber,
    StreetName,
    StreetType,
    StreetDirection,
    UnitNumber,
    UnitType,
}

impl AddressComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressComponent::Address1 => "address1",
            AddressComponent::Address2 => "address2",
            AddressComponent::City => "city",
            AddressComponent::State => "state",
            AddressComponent::Zip5 => "zip5",
            AddressComponent::Zip4 => "zip4",
            AddressComponent::Country => "country",
            AddressComponent::HouseNumber => "house_number",
            AddressComponent::StreetName => "street_name",
            AddressComponent::StreetType => "street_type",
            AddressComponent::StreetDirection => "street_direction",
            AddressComponent::UnitNumber => "unit_number",
            AddressComponent::UnitType => "unit_type",
        }
    }
}

/// Level of government a district belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictLevel {
    Federal,
    State,
    County,
    City,
    Court,
}

impl DistrictLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistrictLevel::Federal => "federal",
            DistrictLevel::State => "state",
            DistrictLevel::County => "county",
            DistrictLevel::City => "city",
            DistrictLevel::Court => "court",
        }
    }

    /// Parse a level string as exported by structured district data.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "federal" => Some(DistrictLevel::Federal),
            "state" => Some(DistrictLevel::State),
            "county" => Some(DistrictLevel::County),
            "city" => Some(DistrictLevel::City),
            "court" => Some(DistrictLevel::Court),
            _ => None,
        }
    }
}

/// Type of election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionType {
    General,
    Primary,
    PrimaryRunoff,
    GeneralRunoff,
    Special,
    Municipal,
    School,
    Local,
    PresidentialPrimary,
    Bond,
    Constitutional,
    Recall,
    Unknown,
}

/// Method used to cast a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMethod {
    Early,
    Absentee,
    DayOf,
    Mail,
    Provisional,
    Unknown,
}

/// Jurisdiction level of an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionJurisdiction {
    Federal,
    State,
    County,
    Municipal,
    SchoolDistrict,
    SpecialDistrict,
    Unknown,
}
