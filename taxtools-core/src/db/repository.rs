use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CalculationRecord, CallerId, NewCalculationRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Append-only store of calculations performed by identified callers.
///
/// There is deliberately no update or delete: a record is immutable once
/// appended.
#[async_trait]
pub trait CalculationLedger: Send + Sync {
    async fn append(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError>;

    async fn get_record(&self, id: i64) -> Result<CalculationRecord, RepositoryError>;

    /// Oldest first. `None` lists every caller's records.
    async fn list_records(
        &self,
        caller_id: Option<&CallerId>,
    ) -> Result<Vec<CalculationRecord>, RepositoryError>;
}
