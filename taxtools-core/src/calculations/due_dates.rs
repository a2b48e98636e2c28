//! Filing and estimated-payment deadlines for a tax year.

use chrono::Month;

use crate::models::{CalendarDate, DueDate, DueDateKind, DueDateSet, Quarter, QuarterlyDueDate};

/// `(years after the tax year, month, day, description, kind)`
const ANNUAL: [(i64, Month, u32, &str, DueDateKind); 4] = [
    (
        1,
        Month::April,
        15,
        "Individual Income Tax Return Filing Deadline",
        DueDateKind::Filing,
    ),
    (
        1,
        Month::January,
        31,
        "W-2 and 1099 Forms Due to Recipients",
        DueDateKind::Forms,
    ),
    (
        1,
        Month::March,
        15,
        "S Corporation and Partnership Returns Due",
        DueDateKind::Business,
    ),
    (
        1,
        Month::October,
        15,
        "Extended Filing Deadline (with extension)",
        DueDateKind::Extension,
    ),
];

/// The fourth installment lands in January two calendar years out.
const QUARTERLY: [(Quarter, i64, Month, u32, &str); 4] = [
    (Quarter::Q1, 1, Month::April, 15, "First Quarter Estimated Tax"),
    (Quarter::Q2, 1, Month::June, 15, "Second Quarter Estimated Tax"),
    (Quarter::Q3, 1, Month::September, 15, "Third Quarter Estimated Tax"),
    (Quarter::Q4, 2, Month::January, 15, "Fourth Quarter Estimated Tax"),
];

/// Builds the deadline calendar for `tax_year`. Any year is accepted.
pub fn due_dates(tax_year: i32) -> DueDateSet {
    let year = i64::from(tax_year);

    let due_dates = ANNUAL
        .iter()
        .map(|&(offset, month, day, description, kind)| DueDate {
            date: CalendarDate::new(year + offset, month, day),
            description,
            kind,
        })
        .collect();

    let quarterly_dates = QUARTERLY
        .iter()
        .map(|&(quarter, offset, month, day, description)| QuarterlyDueDate {
            quarter,
            date: CalendarDate::new(year + offset, month, day),
            description,
        })
        .collect();

    DueDateSet {
        tax_year,
        due_dates,
        quarterly_dates,
    }
}
