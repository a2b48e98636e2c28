use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use taxtools_core::tables::TaxTableRegistryBuilder;
use taxtools_core::{BracketTable, FilingStatus, TableError, TaxBracket};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax table data.
#[derive(Debug, Error)]
pub enum TableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bracket table for {tax_year} {filing_status}: {source}")]
    InvalidTable {
        tax_year: i32,
        filing_status: FilingStatus,
        #[source]
        source: TableError,
    },

    #[error("Standard deduction for {tax_year} {filing_status} is negative: {amount}")]
    NegativeDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
        amount: Decimal,
    },

    #[error("Standard deduction for {tax_year} {filing_status} appears more than once")]
    DuplicateDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
    },
}

impl From<csv::Error> for TableLoaderError {
    fn from(err: csv::Error) -> Self {
        TableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a bracket CSV file.
///
/// Columns:
/// - `tax_year`: the tax year (e.g., 2024)
/// - `filing_status`: camelCase name or short code (`S`, `MFJ`, `MFS`, `HOH`)
/// - `min_income`: lower bound of the bracket
/// - `max_income`: upper bound, empty for the unbounded top bracket
/// - `rate`: marginal rate as a fraction (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    #[serde(deserialize_with = "deserialize_filing_status")]
    pub filing_status: FilingStatus,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A single row of a standard deduction CSV file
/// (`tax_year,filing_status,amount`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionRecord {
    pub tax_year: i32,
    #[serde(deserialize_with = "deserialize_filing_status")]
    pub filing_status: FilingStatus,
    pub amount: Decimal,
}

fn deserialize_filing_status<'de, D>(deserializer: D) -> Result<FilingStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    FilingStatus::parse(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown filing status '{}'", s.trim())))
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax table data from CSV files.
///
/// Tables are validated before they reach the registry builder, so a file
/// with a gap, an inverted band or a regressive rate is rejected as a whole.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse bracket records from any reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse standard deduction records from any reader.
    pub fn parse_deductions<R: Read>(reader: R) -> Result<Vec<DeductionRecord>, TableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: DeductionRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group bracket records by (tax_year, filing_status), validate each group
    /// as a [`BracketTable`] and insert it into `builder`, replacing any table
    /// already there. Returns the number of tables inserted.
    ///
    /// Nothing is inserted unless every group validates.
    pub fn load_brackets(
        builder: &mut TaxTableRegistryBuilder,
        records: &[BracketRecord],
    ) -> Result<usize, TableLoaderError> {
        let mut groups: BTreeMap<(i32, FilingStatus), Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            groups
                .entry((record.tax_year, record.filing_status))
                .or_default()
                .push(TaxBracket::new(record.min_income, record.max_income, record.rate));
        }

        let mut tables = Vec::with_capacity(groups.len());
        for ((tax_year, filing_status), mut brackets) in groups {
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            let table = BracketTable::new(brackets).map_err(|source| {
                TableLoaderError::InvalidTable {
                    tax_year,
                    filing_status,
                    source,
                }
            })?;
            tables.push((tax_year, filing_status, table));
        }

        let loaded = tables.len();
        for (tax_year, filing_status, table) in tables {
            debug!(tax_year, %filing_status, brackets = table.brackets().len(), "loaded bracket table");
            builder.insert_bracket_table(tax_year, filing_status, table);
        }

        Ok(loaded)
    }

    /// Insert standard deduction amounts into `builder`. Returns the number of
    /// amounts inserted. Nothing is inserted if any row is invalid.
    pub fn load_deductions(
        builder: &mut TaxTableRegistryBuilder,
        records: &[DeductionRecord],
    ) -> Result<usize, TableLoaderError> {
        let mut amounts: BTreeMap<(i32, FilingStatus), Decimal> = BTreeMap::new();

        for record in records {
            if record.amount < Decimal::ZERO {
                return Err(TableLoaderError::NegativeDeduction {
                    tax_year: record.tax_year,
                    filing_status: record.filing_status,
                    amount: record.amount,
                });
            }
            let key = (record.tax_year, record.filing_status);
            if amounts.insert(key, record.amount).is_some() {
                return Err(TableLoaderError::DuplicateDeduction {
                    tax_year: record.tax_year,
                    filing_status: record.filing_status,
                });
            }
        }

        let loaded = amounts.len();
        for ((tax_year, filing_status), amount) in amounts {
            builder.insert_standard_deduction(tax_year, filing_status, amount);
        }

        Ok(loaded)
    }

    pub fn load_bracket_file(
        builder: &mut TaxTableRegistryBuilder,
        path: &Path,
    ) -> Result<usize, TableLoaderError> {
        let records = Self::parse_brackets(open(path)?)?;
        let loaded = Self::load_brackets(builder, &records)?;
        info!(path = %path.display(), tables = loaded, "loaded bracket tables");
        Ok(loaded)
    }

    pub fn load_deduction_file(
        builder: &mut TaxTableRegistryBuilder,
        path: &Path,
    ) -> Result<usize, TableLoaderError> {
        let records = Self::parse_deductions(open(path)?)?;
        let loaded = Self::load_deductions(builder, &records)?;
        info!(path = %path.display(), amounts = loaded, "loaded standard deductions");
        Ok(loaded)
    }
}

fn open(path: &Path) -> Result<File, TableLoaderError> {
    File::open(path).map_err(|source| TableLoaderError::Io {
        path: path.display().to_string(),
        source,
    })
}
