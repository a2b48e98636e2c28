mod calculation_record;
mod due_dates;
mod filing_status;
mod standard_deduction;
mod tax_bracket;

pub use calculation_record::{
    CalculationRecord, CalculationType, CallerId, EmptyCallerId, NewCalculationRecord,
};
pub use due_dates::{CalendarDate, DueDate, DueDateKind, DueDateSet, Quarter, QuarterlyDueDate};
pub use filing_status::{FilingStatus, UnknownFilingStatus};
pub use standard_deduction::{DeductionAddOns, StandardDeductionTable};
pub use tax_bracket::{BracketTable, TableError, TaxBracket};
