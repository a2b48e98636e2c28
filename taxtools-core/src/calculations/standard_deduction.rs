//! Standard deduction lookup with age and blindness add-ons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::FilingStatus;
use crate::tables::{AppliedFallback, TableLookupError, TaxTableRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardDeductionInput {
    pub filing_status: FilingStatus,
    pub tax_year: i32,
    #[serde(rename = "age65OrOlder")]
    pub age_65_or_older: bool,
    pub blind: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardDeductionResult {
    pub base_deduction: Decimal,
    pub additional_deduction: Decimal,
    pub total_deduction: Decimal,
    pub filing_status: FilingStatus,
    pub tax_year: i32,
    /// Non-empty when the year or status had no table entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<AppliedFallback>,
}

/// Looks up the base deduction and adds one flat amount per qualifying
/// condition.
///
/// Under the default policy an unsupported year yields a zero base (reported in
/// `fallbacks`) rather than an error; errors only come from a strict policy.
pub fn compute_standard_deduction(
    registry: &TaxTableRegistry,
    input: &StandardDeductionInput,
) -> Result<StandardDeductionResult, TableLookupError> {
    let lookup = registry.base_deduction(input.tax_year, input.filing_status)?;

    let per_condition = registry.add_ons().per_condition(input.filing_status);
    let conditions = u32::from(input.age_65_or_older) + u32::from(input.blind);
    let additional_deduction = per_condition * Decimal::from(conditions);

    let total_deduction = lookup.amount + additional_deduction;

    debug!(
        tax_year = input.tax_year,
        filing_status = %input.filing_status,
        %total_deduction,
        "computed standard deduction"
    );

    Ok(StandardDeductionResult {
        base_deduction: lookup.amount,
        additional_deduction,
        total_deduction,
        filing_status: input.filing_status,
        tax_year: input.tax_year,
        fallbacks: lookup.fallback.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tables::FallbackPolicy;

    fn input(
        filing_status: FilingStatus,
        tax_year: i32,
        age_65_or_older: bool,
        blind: bool,
    ) -> StandardDeductionInput {
        StandardDeductionInput {
            filing_status,
            tax_year,
            age_65_or_older,
            blind,
        }
    }

    fn compute(input: StandardDeductionInput) -> StandardDeductionResult {
        compute_standard_deduction(&TaxTableRegistry::builtin(), &input).unwrap()
    }

    #[test]
    fn no_flags_means_no_additional_deduction() {
        for year in [2023, 2024] {
            for status in FilingStatus::ALL {
                let result = compute(input(status, year, false, false));

                assert_eq!(result.additional_deduction, dec!(0), "{year} {status}");
                assert_eq!(result.total_deduction, result.base_deduction);
            }
        }
    }

    #[test]
    fn single_2024_base() {
        let result = compute(input(FilingStatus::Single, 2024, false, false));

        assert_eq!(result.base_deduction, dec!(14600));
        assert!(result.fallbacks.is_empty());
    }

    #[test]
    fn joint_2023_base() {
        let result = compute(input(FilingStatus::MarriedFilingJointly, 2023, false, false));

        assert_eq!(result.base_deduction, dec!(27700));
    }

    #[test]
    fn head_of_household_2024_base() {
        let result = compute(input(FilingStatus::HeadOfHousehold, 2024, false, false));

        assert_eq!(result.base_deduction, dec!(21900));
    }

    #[test]
    fn joint_filers_add_1500_per_condition() {
        let result = compute(input(FilingStatus::MarriedFilingJointly, 2024, true, true));

        assert_eq!(result.additional_deduction, dec!(3000));
        assert_eq!(result.total_deduction, dec!(32200));
    }

    #[test]
    fn other_filers_add_1850_per_condition() {
        let result = compute(input(FilingStatus::Single, 2024, true, true));

        assert_eq!(result.additional_deduction, dec!(3700));
        assert_eq!(result.total_deduction, dec!(18300));
    }

    #[test]
    fn single_condition_adds_once() {
        let aged = compute(input(FilingStatus::MarriedFilingSeparately, 2023, true, false));
        let blind = compute(input(FilingStatus::MarriedFilingSeparately, 2023, false, true));

        assert_eq!(aged.additional_deduction, dec!(1850));
        assert_eq!(blind.additional_deduction, dec!(1850));
    }

    #[test]
    fn unsupported_year_falls_back_to_zero_base() {
        let result = compute(input(FilingStatus::Single, 2019, true, false));

        assert_eq!(result.base_deduction, dec!(0));
        assert_eq!(result.additional_deduction, dec!(1850));
        assert_eq!(result.total_deduction, dec!(1850));
        assert_eq!(
            result.fallbacks,
            vec![AppliedFallback::ZeroBaseDeduction {
                tax_year: 2019,
                filing_status: FilingStatus::Single,
            }]
        );
    }

    #[test]
    fn strict_policy_rejects_unsupported_year() {
        let registry = TaxTableRegistry::builtin()
            .to_builder()
            .with_policy(FallbackPolicy::strict())
            .build();

        let result =
            compute_standard_deduction(&registry, &input(FilingStatus::Single, 2019, false, false));

        assert_eq!(result, Err(TableLookupError::UnsupportedYear(2019)));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let request = input(FilingStatus::HeadOfHousehold, 2023, true, false);

        assert_eq!(compute(request.clone()), compute(request));
    }

    #[test]
    fn input_serializes_with_camel_case_names() {
        let json = serde_json::to_value(input(FilingStatus::Single, 2024, true, false)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "filingStatus": "single",
                "taxYear": 2024,
                "age65OrOlder": true,
                "blind": false,
            })
        );
    }
}
