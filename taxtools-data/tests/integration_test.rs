//! Integration tests for loading CSV table files into a registry and running
//! the calculators against the result.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use taxtools_core::calculations::{compute_standard_deduction, estimate_tax};
use taxtools_core::{
    EstimatedTaxInput, FilingStatus, StandardDeductionInput, TaxTableRegistry,
};
use taxtools_data::TaxTableLoader;

const TEST_CSV_2025: &str = include_str!("../test-data/tax_brackets_2025.csv");

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

fn registry_with_2025() -> TaxTableRegistry {
    let mut builder = TaxTableRegistry::builtin().to_builder();
    TaxTableLoader::load_bracket_file(&mut builder, &fixture("tax_brackets_2025.csv"))
        .expect("Failed to load brackets");
    TaxTableLoader::load_deduction_file(&mut builder, &fixture("standard_deductions_2025.csv"))
        .expect("Failed to load deductions");
    builder.build()
}

#[test]
fn test_load_all_2025_tables() {
    let records = TaxTableLoader::parse_brackets(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");
    let mut builder = TaxTableRegistry::builder();

    let loaded = TaxTableLoader::load_brackets(&mut builder, &records).expect("Failed to load");

    assert_eq!(records.len(), 28);
    assert_eq!(loaded, 4);
}

#[test]
fn test_loaded_year_is_supported() {
    let registry = registry_with_2025();

    assert_eq!(registry.supported_years(), vec![2023, 2024, 2025]);
}

#[test]
fn test_mfs_table_differs_from_single_at_the_top() {
    let registry = registry_with_2025();

    let mfs = registry
        .bracket_table(2025, FilingStatus::MarriedFilingSeparately)
        .expect("MFS table");

    // loaded directly, no single-table substitution
    assert!(mfs.fallbacks.is_empty());
    assert_eq!(mfs.table.brackets()[6].min_income, dec!(375800));
}

#[test]
fn test_estimate_uses_loaded_brackets() {
    let registry = registry_with_2025();

    let result = estimate_tax(
        &registry,
        &EstimatedTaxInput {
            income: dec!(60000),
            filing_status: FilingStatus::Single,
            deductions: dec!(15000),
            tax_year: 2025,
        },
    )
    .expect("estimate");

    // 1192.50 + 33075 * 0.12 = 5161.50
    assert_eq!(result.taxable_income, dec!(45000));
    assert_eq!(result.estimated_tax, dec!(5162));
    assert_eq!(result.effective_rate, dec!(11.47));
    assert_eq!(result.marginal_rate, dec!(12));
    assert!(result.fallbacks.is_empty());
}

#[test]
fn test_deduction_uses_loaded_amounts() {
    let registry = registry_with_2025();

    let result = compute_standard_deduction(
        &registry,
        &StandardDeductionInput {
            filing_status: FilingStatus::MarriedFilingJointly,
            tax_year: 2025,
            age_65_or_older: true,
            blind: false,
        },
    )
    .expect("deduction");

    assert_eq!(result.base_deduction, dec!(30000));
    assert_eq!(result.total_deduction, dec!(31500));
}

#[test]
fn test_builtin_years_are_untouched() {
    let registry = registry_with_2025();

    let result = estimate_tax(
        &registry,
        &EstimatedTaxInput {
            income: dec!(50000),
            filing_status: FilingStatus::Single,
            deductions: dec!(0),
            tax_year: 2023,
        },
    )
    .expect("estimate");

    assert_eq!(result.estimated_tax, dec!(6308));
}
