use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{BracketTable, DeductionAddOns, FilingStatus, StandardDeductionTable};

/// What to do when the deduction table has no entry for a year or status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeductionFallback {
    /// Look up as a zero base deduction and report it.
    #[default]
    ZeroBase,
    Strict,
}

/// What to do when a filing status has no bracket table for the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketStatusFallback {
    /// Reuse the `single` table.
    #[default]
    UseSingle,
    Strict,
}

/// What to do when no bracket tables exist for the requested year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketYearFallback {
    /// Use the nearest year that has tables; ties go to the earlier year.
    #[default]
    ClosestDefined,
    Strict,
}

/// The registry's policy for lookups that miss.
///
/// The default is lenient everywhere, so none of the calculators fail on
/// well-typed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPolicy {
    pub deduction: DeductionFallback,
    pub bracket_status: BracketStatusFallback,
    pub bracket_year: BracketYearFallback,
}

impl FallbackPolicy {
    pub fn strict() -> Self {
        Self {
            deduction: DeductionFallback::Strict,
            bracket_status: BracketStatusFallback::Strict,
            bracket_year: BracketYearFallback::Strict,
        }
    }
}

/// A fallback the registry applied, reported alongside the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AppliedFallback {
    #[serde(rename_all = "camelCase")]
    ZeroBaseDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
    },
    #[serde(rename_all = "camelCase")]
    BracketYear { requested: i32, used: i32 },
    #[serde(rename_all = "camelCase")]
    BracketStatus {
        requested: FilingStatus,
        used: FilingStatus,
    },
}

impl fmt::Display for AppliedFallback {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::ZeroBaseDeduction {
                tax_year,
                filing_status,
            } => write!(
                f,
                "no standard deduction for {filing_status} in {tax_year}, base of 0 used"
            ),
            Self::BracketYear { requested, used } => {
                write!(f, "no brackets for {requested}, {used} brackets used")
            }
            Self::BracketStatus { requested, used } => {
                write!(f, "no brackets for {requested}, {used} brackets used")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableLookupError {
    #[error("no tax tables for year {0}")]
    UnsupportedYear(i32),

    #[error("no standard deduction for {filing_status} in {tax_year}")]
    MissingDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
    },

    #[error("no bracket table for {filing_status} in {tax_year}")]
    MissingBracketTable {
        tax_year: i32,
        filing_status: FilingStatus,
    },
}

/// Everything the registry knows about a single tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYearTables {
    pub tax_year: i32,
    pub standard_deductions: StandardDeductionTable,
    pub brackets: BTreeMap<FilingStatus, BracketTable>,
}

impl TaxYearTables {
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            standard_deductions: StandardDeductionTable::new(),
            brackets: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionLookup {
    pub amount: Decimal,
    pub fallback: Option<AppliedFallback>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketLookup<'a> {
    pub table: &'a BracketTable,
    pub fallbacks: Vec<AppliedFallback>,
}

/// Immutable, versioned lookup of tax tables keyed by year.
///
/// Built once (see [`TaxTableRegistry::builtin`] or [`TaxTableRegistryBuilder`])
/// and shared read-only; adding a year is a data change, not a code change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxTableRegistry {
    years: BTreeMap<i32, TaxYearTables>,
    add_ons: DeductionAddOns,
    policy: FallbackPolicy,
}

impl TaxTableRegistry {
    pub fn builder() -> TaxTableRegistryBuilder {
        TaxTableRegistryBuilder::default()
    }

    /// Start a builder pre-populated with this registry's contents.
    pub fn to_builder(&self) -> TaxTableRegistryBuilder {
        TaxTableRegistryBuilder {
            years: self.years.clone(),
            add_ons: self.add_ons,
            policy: self.policy,
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn add_ons(&self) -> DeductionAddOns {
        self.add_ons
    }

    /// Years with any table data, ascending.
    pub fn supported_years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    pub fn year(
        &self,
        tax_year: i32,
    ) -> Option<&TaxYearTables> {
        self.years.get(&tax_year)
    }

    pub fn base_deduction(
        &self,
        tax_year: i32,
        filing_status: FilingStatus,
    ) -> Result<DeductionLookup, TableLookupError> {
        let found = self
            .years
            .get(&tax_year)
            .and_then(|tables| tables.standard_deductions.get(filing_status));

        match (found, self.policy.deduction) {
            (Some(amount), _) => Ok(DeductionLookup {
                amount,
                fallback: None,
            }),
            (None, DeductionFallback::ZeroBase) => {
                debug!(tax_year, %filing_status, "no standard deduction, using zero base");
                Ok(DeductionLookup {
                    amount: Decimal::ZERO,
                    fallback: Some(AppliedFallback::ZeroBaseDeduction {
                        tax_year,
                        filing_status,
                    }),
                })
            }
            (None, DeductionFallback::Strict) if self.years.contains_key(&tax_year) => {
                Err(TableLookupError::MissingDeduction {
                    tax_year,
                    filing_status,
                })
            }
            (None, DeductionFallback::Strict) => Err(TableLookupError::UnsupportedYear(tax_year)),
        }
    }

    pub fn bracket_table(
        &self,
        tax_year: i32,
        filing_status: FilingStatus,
    ) -> Result<BracketLookup<'_>, TableLookupError> {
        let mut fallbacks = Vec::new();

        let used_year = self.resolve_bracket_year(tax_year)?;
        if used_year != tax_year {
            fallbacks.push(AppliedFallback::BracketYear {
                requested: tax_year,
                used: used_year,
            });
        }

        let brackets = &self.years[&used_year].brackets;
        let missing = TableLookupError::MissingBracketTable {
            tax_year: used_year,
            filing_status,
        };

        let table = match (brackets.get(&filing_status), self.policy.bracket_status) {
            (Some(table), _) => table,
            (None, BracketStatusFallback::UseSingle) => {
                let table = brackets.get(&FilingStatus::Single).ok_or(missing)?;
                fallbacks.push(AppliedFallback::BracketStatus {
                    requested: filing_status,
                    used: FilingStatus::Single,
                });
                table
            }
            (None, BracketStatusFallback::Strict) => return Err(missing),
        };

        if !fallbacks.is_empty() {
            debug!(tax_year, %filing_status, ?fallbacks, "bracket table resolved via fallback");
        }

        Ok(BracketLookup { table, fallbacks })
    }

    /// Picks the year whose bracket tables answer a request for `tax_year`.
    fn resolve_bracket_year(
        &self,
        tax_year: i32,
    ) -> Result<i32, TableLookupError> {
        let has_brackets = |tables: &&TaxYearTables| !tables.brackets.is_empty();

        if self.years.get(&tax_year).is_some_and(|t| has_brackets(&t)) {
            return Ok(tax_year);
        }

        match self.policy.bracket_year {
            BracketYearFallback::Strict => Err(TableLookupError::UnsupportedYear(tax_year)),
            BracketYearFallback::ClosestDefined => self
                .years
                .values()
                .filter(has_brackets)
                .map(|tables| tables.tax_year)
                .min_by_key(|year| ((i64::from(*year) - i64::from(tax_year)).abs(), *year))
                .ok_or(TableLookupError::UnsupportedYear(tax_year)),
        }
    }
}

impl Default for TaxTableRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Collects table data before freezing it into a [`TaxTableRegistry`].
#[derive(Debug, Clone, Default)]
pub struct TaxTableRegistryBuilder {
    years: BTreeMap<i32, TaxYearTables>,
    add_ons: DeductionAddOns,
    policy: FallbackPolicy,
}

impl TaxTableRegistryBuilder {
    pub fn with_policy(
        mut self,
        policy: FallbackPolicy,
    ) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_add_ons(
        mut self,
        add_ons: DeductionAddOns,
    ) -> Self {
        self.add_ons = add_ons;
        self
    }

    /// Sets (or replaces) the base deduction for a year and status.
    pub fn insert_standard_deduction(
        &mut self,
        tax_year: i32,
        filing_status: FilingStatus,
        amount: Decimal,
    ) -> &mut Self {
        self.year_mut(tax_year)
            .standard_deductions
            .insert(filing_status, amount);
        self
    }

    /// Sets (or replaces) the bracket table for a year and status.
    pub fn insert_bracket_table(
        &mut self,
        tax_year: i32,
        filing_status: FilingStatus,
        table: BracketTable,
    ) -> &mut Self {
        self.year_mut(tax_year).brackets.insert(filing_status, table);
        self
    }

    pub fn build(self) -> TaxTableRegistry {
        TaxTableRegistry {
            years: self.years,
            add_ons: self.add_ons,
            policy: self.policy,
        }
    }

    fn year_mut(
        &mut self,
        tax_year: i32,
    ) -> &mut TaxYearTables {
        self.years
            .entry(tax_year)
            .or_insert_with(|| TaxYearTables::new(tax_year))
    }
}
