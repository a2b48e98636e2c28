//! Progressive bracket tax estimate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use taxtools_core::calculations::{EstimatedTaxInput, estimate_tax};
//! use taxtools_core::{FilingStatus, TaxTableRegistry};
//!
//! let input = EstimatedTaxInput {
//!     income: dec!(50000),
//!     filing_status: FilingStatus::Single,
//!     deductions: dec!(0),
//!     tax_year: 2023,
//! };
//!
//! let result = estimate_tax(&TaxTableRegistry::builtin(), &input).unwrap();
//!
//! // 11000 × 10% + 33725 × 12% + 5275 × 22% = 6307.50
//! assert_eq!(result.estimated_tax, dec!(6308));
//! assert_eq!(result.marginal_rate, dec!(22));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_away, round_whole, to_percent};
use crate::models::{BracketTable, FilingStatus};
use crate::tables::{AppliedFallback, TableLookupError, TaxTableRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedTaxInput {
    pub income: Decimal,
    pub filing_status: FilingStatus,
    pub deductions: Decimal,
    pub tax_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedTaxResult {
    pub taxable_income: Decimal,
    /// Whole currency units.
    pub estimated_tax: Decimal,
    /// Percent of taxable income, two decimal places.
    pub effective_rate: Decimal,
    /// Percent applied to the last unit of taxable income.
    pub marginal_rate: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<AppliedFallback>,
}

/// Estimates tax by walking the bracket table for the filing status.
///
/// Taxable income is `income - deductions` clamped at zero. The walk
/// accumulates unrounded amounts; only the presented figures are rounded.
pub fn estimate_tax(
    registry: &TaxTableRegistry,
    input: &EstimatedTaxInput,
) -> Result<EstimatedTaxResult, TableLookupError> {
    let taxable_income = non_negative(input.income - input.deductions);

    let lookup = registry.bracket_table(input.tax_year, input.filing_status)?;

    let tax = bracket_tax(lookup.table, taxable_income);

    let effective_rate = if taxable_income > Decimal::ZERO {
        round_half_away(tax / taxable_income * Decimal::ONE_HUNDRED, 2)
    } else {
        Decimal::ZERO
    };

    let estimated_tax = round_whole(tax);

    debug!(
        tax_year = input.tax_year,
        filing_status = %input.filing_status,
        %taxable_income,
        %estimated_tax,
        "estimated tax"
    );

    Ok(EstimatedTaxResult {
        taxable_income,
        estimated_tax,
        effective_rate,
        marginal_rate: to_percent(marginal_rate(lookup.table, taxable_income)),
        fallbacks: lookup.fallbacks,
    })
}

/// Unrounded tax on `taxable_income` across every bracket it reaches.
pub fn bracket_tax(
    table: &BracketTable,
    taxable_income: Decimal,
) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut remaining = taxable_income;

    for bracket in table.iter() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let in_bracket = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += in_bracket * bracket.rate;
        remaining -= in_bracket;
    }

    tax
}

/// Rate of the bracket whose `(min, max]` range holds `taxable_income`, as a
/// fraction; zero when none does (including zero income).
pub fn marginal_rate(
    table: &BracketTable,
    taxable_income: Decimal,
) -> Decimal {
    table
        .iter()
        .find(|bracket| bracket.contains(taxable_income))
        .map_or(Decimal::ZERO, |bracket| bracket.rate)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tables::FallbackPolicy;

    fn input(
        income: Decimal,
        filing_status: FilingStatus,
        deductions: Decimal,
        tax_year: i32,
    ) -> EstimatedTaxInput {
        EstimatedTaxInput {
            income,
            filing_status,
            deductions,
            tax_year,
        }
    }

    fn estimate(input: EstimatedTaxInput) -> EstimatedTaxResult {
        estimate_tax(&TaxTableRegistry::builtin(), &input).unwrap()
    }

    fn single_2023() -> BracketTable {
        let registry = TaxTableRegistry::builtin();
        registry
            .bracket_table(2023, FilingStatus::Single)
            .unwrap()
            .table
            .clone()
    }

    // =========================================================================
    // estimate_tax tests
    // =========================================================================

    #[test]
    fn zero_income_is_zero_tax() {
        let result = estimate(input(dec!(0), FilingStatus::Single, dec!(0), 2023));

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.estimated_tax, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
        assert_eq!(result.marginal_rate, dec!(0));
    }

    #[test]
    fn fifty_thousand_single_2023_spans_three_brackets() {
        let result = estimate(input(dec!(50000), FilingStatus::Single, dec!(0), 2023));

        // 1100 + 4047 + 1160.50 = 6307.50, rounded half away from zero
        assert_eq!(result.taxable_income, dec!(50000));
        assert_eq!(result.estimated_tax, dec!(6308));
        assert_eq!(result.effective_rate, dec!(12.62));
        assert_eq!(result.marginal_rate, dec!(22));
        assert!(result.fallbacks.is_empty());
    }

    #[test]
    fn deductions_reduce_taxable_income() {
        let result = estimate(input(dec!(64600), FilingStatus::Single, dec!(14600), 2023));

        assert_eq!(result.taxable_income, dec!(50000));
        assert_eq!(result.estimated_tax, dec!(6308));
    }

    #[test]
    fn deductions_above_income_clamp_to_zero_for_every_status() {
        for status in FilingStatus::ALL {
            let result = estimate(input(dec!(10000), status, dec!(20000), 2024));

            assert_eq!(result.taxable_income, dec!(0), "{status}");
            assert_eq!(result.estimated_tax, dec!(0), "{status}");
            assert_eq!(result.effective_rate, dec!(0), "{status}");
        }
    }

    #[test]
    fn income_at_bracket_edge_stays_in_lower_bracket() {
        let result = estimate(input(dec!(11000), FilingStatus::Single, dec!(0), 2023));

        assert_eq!(result.estimated_tax, dec!(1100));
        assert_eq!(result.effective_rate, dec!(10));
        assert_eq!(result.marginal_rate, dec!(10));
    }

    #[test]
    fn top_bracket_is_unbounded() {
        let result = estimate(input(dec!(700000), FilingStatus::Single, dec!(0), 2023));

        assert_eq!(result.estimated_tax, dec!(219336));
        assert_eq!(result.marginal_rate, dec!(37));
    }

    #[test]
    fn fifty_thousand_single_2024_matches_2023() {
        let result = estimate(input(dec!(50000), FilingStatus::Single, dec!(0), 2024));

        assert_eq!(result.taxable_income, dec!(50000));
        assert_eq!(result.estimated_tax, dec!(6308));
        assert_eq!(result.effective_rate, dec!(12.62));
        assert_eq!(result.marginal_rate, dec!(22));
        assert!(result.fallbacks.is_empty());
    }

    #[test]
    fn joint_2024_uses_joint_table() {
        let result = estimate(input(
            dec!(100000),
            FilingStatus::MarriedFilingJointly,
            dec!(0),
            2024,
        ));

        // 2200 + 8094 + 2321
        assert_eq!(result.estimated_tax, dec!(12615));
        assert_eq!(result.effective_rate, dec!(12.62));
        assert_eq!(result.marginal_rate, dec!(22));
        assert!(result.fallbacks.is_empty());
    }

    #[test]
    fn head_of_household_uses_single_table() {
        let result = estimate(input(dec!(50000), FilingStatus::HeadOfHousehold, dec!(0), 2024));

        assert_eq!(result.estimated_tax, dec!(6308));
        assert_eq!(
            result.fallbacks,
            vec![AppliedFallback::BracketStatus {
                requested: FilingStatus::HeadOfHousehold,
                used: FilingStatus::Single,
            }]
        );
    }

    #[test]
    fn unknown_year_uses_closest_table_year() {
        let result = estimate(input(dec!(50000), FilingStatus::Single, dec!(0), 2025));

        assert_eq!(result.estimated_tax, dec!(6308));
        assert_eq!(
            result.fallbacks,
            vec![AppliedFallback::BracketYear {
                requested: 2025,
                used: 2024,
            }]
        );
    }

    #[test]
    fn strict_policy_rejects_missing_status_table() {
        let registry = TaxTableRegistry::builtin()
            .to_builder()
            .with_policy(FallbackPolicy::strict())
            .build();

        let result = estimate_tax(
            &registry,
            &input(dec!(50000), FilingStatus::MarriedFilingSeparately, dec!(0), 2024),
        );

        assert_eq!(
            result,
            Err(TableLookupError::MissingBracketTable {
                tax_year: 2024,
                filing_status: FilingStatus::MarriedFilingSeparately,
            })
        );
    }

    #[test]
    fn tax_never_decreases_as_income_rises() {
        for year in [2023, 2024] {
            for status in FilingStatus::ALL {
                let mut previous = Decimal::ZERO;
                let mut income = Decimal::ZERO;
                while income <= dec!(900000) {
                    let result = estimate(input(income, status, dec!(0), year));
                    assert!(
                        result.estimated_tax >= previous,
                        "{year} {status}: tax fell at {income}"
                    );
                    previous = result.estimated_tax;
                    income += dec!(1250.25);
                }
            }
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let request = input(dec!(123456.78), FilingStatus::MarriedFilingJointly, dec!(29200), 2024);

        assert_eq!(estimate(request.clone()), estimate(request));
    }

    // =========================================================================
    // bracket_tax / marginal_rate tests
    // =========================================================================

    #[test]
    fn bracket_tax_keeps_fractional_cents() {
        let tax = bracket_tax(&single_2023(), dec!(50000));

        assert_eq!(tax, dec!(6307.50));
    }

    #[test]
    fn bracket_tax_of_zero_is_zero() {
        assert_eq!(bracket_tax(&single_2023(), dec!(0)), dec!(0));
    }

    #[test]
    fn marginal_rate_is_zero_for_zero_income() {
        assert_eq!(marginal_rate(&single_2023(), dec!(0)), dec!(0));
    }

    #[test]
    fn marginal_rate_moves_up_just_past_edge() {
        assert_eq!(marginal_rate(&single_2023(), dec!(44725)), dec!(0.12));
        assert_eq!(marginal_rate(&single_2023(), dec!(44725.01)), dec!(0.22));
    }
}
