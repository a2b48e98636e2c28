use std::fmt;

use chrono::{Month, NaiveDate};
use serde::{Serialize, Serializer};

/// A calendar day whose year may lie outside chrono's representable range.
///
/// Due dates are advisory and accept any tax year, so the year is kept as a
/// plain `i64` instead of forcing everything through [`NaiveDate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: i64,
    pub month: Month,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(
        year: i64,
        month: Month,
        day: u32,
    ) -> Self {
        Self { year, month, day }
    }

    /// `None` when the year is outside what chrono can represent.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year).ok()?;
        NaiveDate::from_ymd_opt(year, self.month.number_from_month(), self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} {}, {}", self.month.name(), self.day, self.year)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DueDateKind {
    Filing,
    Forms,
    Business,
    Extension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueDate {
    pub date: CalendarDate,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: DueDateKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlyDueDate {
    pub quarter: Quarter,
    pub date: CalendarDate,
    pub description: &'static str,
}

/// Annual filing deadlines and quarterly estimated-payment deadlines for a
/// tax year. Derived on every call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateSet {
    pub tax_year: i32,
    pub due_dates: Vec<DueDate>,
    pub quarterly_dates: Vec<QuarterlyDueDate>,
}
