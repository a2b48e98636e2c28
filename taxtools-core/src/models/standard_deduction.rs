use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Base standard deduction per filing status for one tax year.
///
/// A status without an entry looks up as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductionTable {
    amounts: BTreeMap<FilingStatus, Decimal>,
}

impl StandardDeductionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amount(
        mut self,
        status: FilingStatus,
        amount: Decimal,
    ) -> Self {
        self.insert(status, amount);
        self
    }

    pub fn insert(
        &mut self,
        status: FilingStatus,
        amount: Decimal,
    ) {
        self.amounts.insert(status, amount);
    }

    pub fn get(
        &self,
        status: FilingStatus,
    ) -> Option<Decimal> {
        self.amounts.get(&status).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// Flat add-on per qualifying condition (65 or older, blind).
///
/// Joint filers get the smaller amount; every other status gets `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionAddOns {
    pub married_filing_jointly: Decimal,
    pub other: Decimal,
}

impl DeductionAddOns {
    pub fn per_condition(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        match status {
            FilingStatus::MarriedFilingJointly => self.married_filing_jointly,
            _ => self.other,
        }
    }
}

impl Default for DeductionAddOns {
    fn default() -> Self {
        Self {
            married_filing_jointly: Decimal::from(1500),
            other: Decimal::from(1850),
        }
    }
}
