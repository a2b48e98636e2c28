//! The three calculators: standard deduction, bracket tax estimate and the
//! deadline calendar. All are pure functions of their inputs and the
//! [`TaxTableRegistry`](crate::TaxTableRegistry).

pub mod common;
pub mod due_dates;
pub mod estimated_tax;
pub mod standard_deduction;

pub use due_dates::due_dates;
pub use estimated_tax::{EstimatedTaxInput, EstimatedTaxResult, bracket_tax, estimate_tax, marginal_rate};
pub use standard_deduction::{
    StandardDeductionInput, StandardDeductionResult, compute_standard_deduction,
};
