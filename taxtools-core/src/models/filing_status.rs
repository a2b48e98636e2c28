use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of filing statuses the calculators understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

/// Returned when a string names no known filing status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filing status '{0}'; expected one of single, marriedFilingJointly, marriedFilingSeparately, headOfHousehold")]
pub struct UnknownFilingStatus(pub String);

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedFilingJointly => "marriedFilingJointly",
            Self::MarriedFilingSeparately => "marriedFilingSeparately",
            Self::HeadOfHousehold => "headOfHousehold",
        }
    }

    /// Short code used in CSV table files.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
        }
    }

    /// Accepts either the camelCase name or the short code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "single" | "S" => Some(Self::Single),
            "marriedFilingJointly" | "MFJ" => Some(Self::MarriedFilingJointly),
            "marriedFilingSeparately" | "MFS" => Some(Self::MarriedFilingSeparately),
            "headOfHousehold" | "HOH" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = UnknownFilingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownFilingStatus(s.to_string()))
    }
}
