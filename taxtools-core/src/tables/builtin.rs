//! Built-in 2023 and 2024 figures.
//!
//! Both years share the 2023 bracket schedules; only the standard deduction
//! bases differ between them. Later years come from data files.
//!
//! Only `single` and `marriedFilingJointly` carry bracket tables; the other
//! statuses resolve through [`BracketStatusFallback::UseSingle`].
//!
//! [`BracketStatusFallback::UseSingle`]: super::BracketStatusFallback::UseSingle

use rust_decimal::Decimal;

use super::registry::{TaxTableRegistry, TaxTableRegistryBuilder};
use crate::models::{BracketTable, FilingStatus, TaxBracket};

/// `(upper bound, rate in percent)`; the lower bound is the previous upper.
type Schedule = [(Option<i64>, i64); 7];

const SINGLE_2023: Schedule = [
    (Some(11_000), 10),
    (Some(44_725), 12),
    (Some(95_375), 22),
    (Some(182_050), 24),
    (Some(231_250), 32),
    (Some(578_125), 35),
    (None, 37),
];

const JOINT_2023: Schedule = [
    (Some(22_000), 10),
    (Some(89_450), 12),
    (Some(190_750), 22),
    (Some(364_200), 24),
    (Some(462_500), 32),
    (Some(693_750), 35),
    (None, 37),
];

/// `[single, marriedFilingJointly, marriedFilingSeparately, headOfHousehold]`
const DEDUCTIONS_2023: [i64; 4] = [13_850, 27_700, 13_850, 20_800];
const DEDUCTIONS_2024: [i64; 4] = [14_600, 29_200, 14_600, 21_900];

fn brackets(schedule: &Schedule) -> Vec<TaxBracket> {
    let mut lower = Decimal::ZERO;
    schedule
        .iter()
        .map(|&(upper, percent)| {
            let upper = upper.map(Decimal::from);
            let bracket = TaxBracket::new(lower, upper, Decimal::new(percent, 2));
            lower = upper.unwrap_or(lower);
            bracket
        })
        .collect()
}

fn add_year(
    builder: &mut TaxTableRegistryBuilder,
    tax_year: i32,
    deductions: [i64; 4],
    single: &Schedule,
    joint: &Schedule,
) {
    for (status, amount) in FilingStatus::ALL.into_iter().zip(deductions) {
        builder.insert_standard_deduction(tax_year, status, Decimal::from(amount));
    }
    builder
        .insert_bracket_table(
            tax_year,
            FilingStatus::Single,
            BracketTable::from_trusted(brackets(single)),
        )
        .insert_bracket_table(
            tax_year,
            FilingStatus::MarriedFilingJointly,
            BracketTable::from_trusted(brackets(joint)),
        );
}

impl TaxTableRegistry {
    /// The tables shipped with the crate, under the default fallback policy.
    pub fn builtin() -> Self {
        let mut builder = Self::builder();
        add_year(&mut builder, 2023, DEDUCTIONS_2023, &SINGLE_2023, &JOINT_2023);
        add_year(&mut builder, 2024, DEDUCTIONS_2024, &SINGLE_2023, &JOINT_2023);
        builder.build()
    }
}
