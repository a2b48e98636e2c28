//! Request boundary for the calculators.
//!
//! [`TaxToolsService`] validates requests, runs the pure calculations and, for
//! identified callers, appends a record to the ledger in the background. A
//! ledger failure is logged and never changes what the caller gets back.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::calculations::{
    EstimatedTaxInput, EstimatedTaxResult, StandardDeductionInput, StandardDeductionResult,
    compute_standard_deduction, due_dates, estimate_tax,
};
use crate::db::CalculationLedger;
use crate::models::{CalculationType, CallerId, DueDateSet, NewCalculationRecord};
use crate::tables::{TableLookupError, TaxTableRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error(transparent)]
    Table(#[from] TableLookupError),
}

pub struct TaxToolsService {
    tables: Arc<TaxTableRegistry>,
    ledger: Option<Arc<dyn CalculationLedger>>,
    pending: Mutex<JoinSet<()>>,
}

impl TaxToolsService {
    /// A service with no ledger; nothing is ever recorded.
    pub fn new(tables: Arc<TaxTableRegistry>) -> Self {
        Self {
            tables,
            ledger: None,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_ledger(
        mut self,
        ledger: Arc<dyn CalculationLedger>,
    ) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn tables(&self) -> &TaxTableRegistry {
        &self.tables
    }

    pub fn ledger(&self) -> Option<&Arc<dyn CalculationLedger>> {
        self.ledger.as_ref()
    }

    pub fn standard_deduction(
        &self,
        caller: Option<CallerId>,
        input: StandardDeductionInput,
    ) -> Result<StandardDeductionResult, CalculationError> {
        let result = compute_standard_deduction(&self.tables, &input)?;

        self.record(
            caller,
            CalculationType::StandardDeduction,
            &input,
            result.total_deduction,
        );

        Ok(result)
    }

    pub fn estimated_tax(
        &self,
        caller: Option<CallerId>,
        input: EstimatedTaxInput,
    ) -> Result<EstimatedTaxResult, CalculationError> {
        require_non_negative("income", input.income)?;
        require_non_negative("deductions", input.deductions)?;

        let result = estimate_tax(&self.tables, &input)?;

        self.record(
            caller,
            CalculationType::EstimatedTax,
            &input,
            result.estimated_tax,
        );

        Ok(result)
    }

    /// Due dates involve no caller and are never recorded.
    pub fn due_dates(
        &self,
        tax_year: i32,
    ) -> DueDateSet {
        due_dates(tax_year)
    }

    /// Waits for every outstanding ledger append. Returns how many finished
    /// without panicking; append errors themselves were already logged.
    pub async fn flush(&self) -> usize {
        let mut pending = {
            let mut guard = self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *guard)
        };

        let mut completed = 0;
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok(()) => completed += 1,
                Err(error) => warn!(?error, "ledger append task did not complete"),
            }
        }
        completed
    }

    /// Fire-and-forget append for identified callers.
    fn record<T: Serialize>(
        &self,
        caller: Option<CallerId>,
        calculation_type: CalculationType,
        inputs: &T,
        result: Decimal,
    ) {
        let (Some(caller_id), Some(ledger)) = (caller, &self.ledger) else {
            return;
        };

        let inputs = match serde_json::to_value(inputs) {
            Ok(inputs) => inputs,
            Err(error) => {
                warn!(%calculation_type, %error, "could not serialize calculation inputs");
                return;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!(%calculation_type, "no async runtime, calculation not recorded");
            return;
        };

        let ledger = Arc::clone(ledger);
        let record = NewCalculationRecord {
            caller_id: Some(caller_id),
            calculation_type,
            inputs,
            result,
        };

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // reap finished appends so the set does not grow without bound
        while pending.try_join_next().is_some() {}
        pending.spawn_on(
            async move {
                match ledger.append(record).await {
                    Ok(stored) => debug!(id = stored.id, %calculation_type, "calculation recorded"),
                    Err(error) => warn!(%calculation_type, %error, "failed to record calculation"),
                }
            },
            &runtime,
        );
    }
}

fn require_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), CalculationError> {
    if value < Decimal::ZERO {
        return Err(CalculationError::NegativeAmount { field, value });
    }
    Ok(())
}
