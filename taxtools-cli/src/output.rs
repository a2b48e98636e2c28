//! Text and JSON rendering of command results.

use std::io::{self, Write};

use serde::Serialize;
use taxtools_core::models::{DueDateKind, DueDateSet};
use taxtools_core::tables::FallbackPolicy;
use taxtools_core::{
    AppliedFallback, CalculationRecord, EstimatedTaxResult, FilingStatus,
    StandardDeductionResult, TaxTableRegistry,
};

use crate::cli::OutputFormat;
use crate::utils::format_amount;

pub fn json<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn notes<W: Write>(
    out: &mut W,
    fallbacks: &[AppliedFallback],
) -> io::Result<()> {
    for fallback in fallbacks {
        writeln!(out, "  note: {fallback}")?;
    }
    Ok(())
}

pub fn deduction<W: Write>(
    out: &mut W,
    format: OutputFormat,
    result: &StandardDeductionResult,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return json(out, result);
    }
    writeln!(
        out,
        "Standard deduction, {} {}",
        result.tax_year, result.filing_status
    )?;
    writeln!(out, "  Base deduction:        {:>10}", format_amount(result.base_deduction))?;
    writeln!(out, "  Additional deduction:  {:>10}", format_amount(result.additional_deduction))?;
    writeln!(out, "  Total deduction:       {:>10}", format_amount(result.total_deduction))?;
    notes(out, &result.fallbacks)
}

pub fn estimate<W: Write>(
    out: &mut W,
    format: OutputFormat,
    result: &EstimatedTaxResult,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return json(out, result);
    }
    writeln!(out, "Estimated tax")?;
    writeln!(out, "  Taxable income:  {:>12}", format_amount(result.taxable_income))?;
    writeln!(out, "  Estimated tax:   {:>12}", format_amount(result.estimated_tax))?;
    writeln!(out, "  Effective rate:  {:>11}%", result.effective_rate.to_string())?;
    writeln!(out, "  Marginal rate:   {:>11}%", result.marginal_rate.normalize().to_string())?;
    notes(out, &result.fallbacks)
}

fn kind_label(kind: DueDateKind) -> &'static str {
    match kind {
        DueDateKind::Filing => "filing",
        DueDateKind::Forms => "forms",
        DueDateKind::Business => "business",
        DueDateKind::Extension => "extension",
    }
}

pub fn due_dates<W: Write>(
    out: &mut W,
    format: OutputFormat,
    dates: &DueDateSet,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return json(out, dates);
    }
    writeln!(out, "Due dates for tax year {}", dates.tax_year)?;
    for due in &dates.due_dates {
        writeln!(
            out,
            "  {:<20} {:<10} {}",
            due.date.to_string(),
            kind_label(due.kind),
            due.description
        )?;
    }
    writeln!(out, "Estimated tax payments")?;
    for due in &dates.quarterly_dates {
        writeln!(out, "  {:<20} {}", due.date.to_string(), due.description)?;
    }
    Ok(())
}

pub fn history<W: Write>(
    out: &mut W,
    format: OutputFormat,
    records: &[CalculationRecord],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return json(out, records);
    }
    if records.is_empty() {
        return writeln!(out, "No calculations recorded.");
    }
    for record in records {
        writeln!(
            out,
            "{:>5}  {}  {:<18} {:>12}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.calculation_type.as_str(),
            format_amount(record.result),
            record.caller_id.as_ref().map_or("-", |c| c.as_str()),
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TablesSummary<'a> {
    supported_years: Vec<i32>,
    policy: FallbackPolicy,
    years: Vec<&'a taxtools_core::tables::TaxYearTables>,
}

pub fn tables<W: Write>(
    out: &mut W,
    format: OutputFormat,
    registry: &TaxTableRegistry,
) -> io::Result<()> {
    let supported_years = registry.supported_years();

    if format == OutputFormat::Json {
        let summary = TablesSummary {
            years: supported_years
                .iter()
                .filter_map(|year| registry.year(*year))
                .collect(),
            supported_years,
            policy: registry.policy(),
        };
        return json(out, &summary);
    }

    for year in supported_years.iter().filter_map(|year| registry.year(*year)) {
        writeln!(out, "{}", year.tax_year)?;
        for status in FilingStatus::ALL {
            let deduction = year
                .standard_deductions
                .get(status)
                .map_or_else(|| "-".to_string(), format_amount);
            let brackets = year
                .brackets
                .get(&status)
                .map_or_else(|| "-".to_string(), |t| t.brackets().len().to_string());
            writeln!(
                out,
                "  {:<24} deduction {:>8}  brackets {:>2}",
                status.to_string(),
                deduction,
                brackets
            )?;
        }
    }
    Ok(())
}
