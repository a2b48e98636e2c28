use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of an authenticated caller, as resolved by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("caller id must not be empty")]
pub struct EmptyCallerId;

impl CallerId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, EmptyCallerId> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(EmptyCallerId);
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CallerId {
    type Err = EmptyCallerId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CallerId {
    type Error = EmptyCallerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallerId> for String {
    fn from(id: CallerId) -> Self {
        id.0
    }
}

/// Which calculator produced a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationType {
    StandardDeduction,
    EstimatedTax,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StandardDeduction => "standardDeduction",
            Self::EstimatedTax => "estimatedTax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standardDeduction" => Some(Self::StandardDeduction),
            "estimatedTax" => Some(Self::EstimatedTax),
            _ => None,
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An appended ledger entry. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: i64,
    pub caller_id: Option<CallerId>,
    pub calculation_type: CalculationType,
    /// The request exactly as the caller supplied it.
    pub inputs: serde_json::Value,
    /// Headline figure: total deduction or rounded estimated tax.
    pub result: Decimal,
    pub created_at: DateTime<Utc>,
}

/// For appending new records (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalculationRecord {
    pub caller_id: Option<CallerId>,
    pub calculation_type: CalculationType,
    pub inputs: serde_json::Value,
    pub result: Decimal,
}
