use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use taxtools_core::{
    CalculationLedger, CalculationRecord, CalculationType, CallerId, NewCalculationRecord,
    RepositoryError,
};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal};

const SELECT_RECORDS: &str = "SELECT id, caller_id, calculation_type, inputs, result, created_at
     FROM calculation_records";

pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Connect to `database_url`, which may be a sqlx URL (`sqlite:taxtools.db`),
    /// a bare file path or `:memory:`. Missing database files are created.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_record(row: &SqliteRow) -> Result<CalculationRecord, RepositoryError> {
    let caller_id: Option<String> = row
        .try_get("caller_id")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let calculation_type: String = row
        .try_get("calculation_type")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let inputs: String = row
        .try_get("inputs")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(CalculationRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        caller_id: caller_id
            .map(CallerId::new)
            .transpose()
            .map_err(|e| RepositoryError::Database(format!("Invalid caller_id: {}", e)))?,
        calculation_type: CalculationType::parse(&calculation_type).ok_or_else(|| {
            RepositoryError::Database(format!("Unknown calculation_type '{}'", calculation_type))
        })?,
        inputs: serde_json::from_str(&inputs)
            .map_err(|e| RepositoryError::Database(format!("Failed to parse inputs: {}", e)))?,
        result: get_decimal(row, "result")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

#[async_trait]
impl CalculationLedger for SqliteLedger {
    async fn append(
        &self,
        record: NewCalculationRecord,
    ) -> Result<CalculationRecord, RepositoryError> {
        let inputs = serde_json::to_string(&record.inputs)
            .map_err(|e| RepositoryError::Database(format!("Failed to encode inputs: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO calculation_records (
                caller_id, calculation_type, inputs, result, created_at
            ) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.caller_id.as_ref().map(CallerId::as_str))
        .bind(record.calculation_type.as_str())
        .bind(inputs)
        .bind(decimal_to_text(record.result))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!(id, calculation_type = %record.calculation_type, "appended calculation record");
        self.get_record(id).await
    }

    async fn get_record(
        &self,
        id: i64,
    ) -> Result<CalculationRecord, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_RECORDS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_record(&row)
    }

    async fn list_records(
        &self,
        caller_id: Option<&CallerId>,
    ) -> Result<Vec<CalculationRecord>, RepositoryError> {
        let rows = match caller_id {
            Some(caller) => {
                sqlx::query(&format!("{} WHERE caller_id = ? ORDER BY id ASC", SELECT_RECORDS))
                    .bind(caller.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id ASC", SELECT_RECORDS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }
}
