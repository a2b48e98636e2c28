use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::factory::{DbConfig, LedgerFactory};
use super::repository::{CalculationLedger, RepositoryError};
use crate::models::{CalculationRecord, CallerId, NewCalculationRecord};

/// Process-local ledger. Records vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<CalculationRecord>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CalculationRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Database("memory ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl CalculationLedger for MemoryLedger {
    async fn append(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError> {
        let mut records = self.lock()?;
        let stored = CalculationRecord {
            id: records.len() as i64 + 1,
            caller_id: record.caller_id,
            calculation_type: record.calculation_type,
            inputs: record.inputs,
            result: record.result,
            created_at: Utc::now(),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get_record(
        &self,
        id: i64,
    ) -> Result<CalculationRecord, RepositoryError> {
        self.lock()?
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_records(
        &self,
        caller_id: Option<&CallerId>,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| caller_id.is_none_or(|id| r.caller_id.as_ref() == Some(id)))
            .cloned()
            .collect())
    }
}

/// [`LedgerFactory`] for the `"memory"` backend. The connection string is
/// ignored.
pub struct MemoryLedgerFactory;

#[async_trait]
impl LedgerFactory for MemoryLedgerFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn CalculationLedger>, RepositoryError> {
        Ok(Box::new(MemoryLedger::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::CalculationType;

    fn record(caller: Option<&str>) -> NewCalculationRecord {
        NewCalculationRecord {
            caller_id: caller.map(|c| CallerId::new(c).unwrap()),
            calculation_type: CalculationType::EstimatedTax,
            inputs: serde_json::json!({ "income": "50000" }),
            result: dec!(6308),
        }
    }

    #[tokio::test]
    async fn append_assigns_sequential_ids() {
        let ledger = MemoryLedger::new();

        let first = ledger.append(record(Some("a"))).await.unwrap();
        let second = ledger.append(record(Some("b"))).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.result, dec!(6308));
    }

    #[tokio::test]
    async fn get_record_finds_appended_record() {
        let ledger = MemoryLedger::new();
        let stored = ledger.append(record(Some("a"))).await.unwrap();

        assert_eq!(ledger.get_record(stored.id).await, Ok(stored));
        assert_eq!(ledger.get_record(99).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn list_records_filters_by_caller() {
        let ledger = MemoryLedger::new();
        ledger.append(record(Some("a"))).await.unwrap();
        ledger.append(record(Some("b"))).await.unwrap();
        ledger.append(record(Some("a"))).await.unwrap();

        let caller = CallerId::new("a").unwrap();
        let mine = ledger.list_records(Some(&caller)).await.unwrap();
        let all = ledger.list_records(None).await.unwrap();

        assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn factory_creates_empty_ledger() {
        let ledger = MemoryLedgerFactory
            .create(&DbConfig::default())
            .await
            .unwrap();

        assert!(ledger.list_records(None).await.unwrap().is_empty());
    }
}
