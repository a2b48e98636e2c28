use async_trait::async_trait;

use taxtools_core::db::{DbConfig, LedgerFactory};
use taxtools_core::{CalculationLedger, RepositoryError};

use crate::repository::SqliteLedger;

/// [`LedgerFactory`] for SQLite.
///
/// Register this with a [`taxtools_core::db::LedgerRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use taxtools_core::db::LedgerRegistry;
/// use taxtools_db_sqlite::SqliteLedgerFactory;
///
/// let mut registry = LedgerRegistry::new();
/// registry.register(Box::new(SqliteLedgerFactory));
/// ```
pub struct SqliteLedgerFactory;

#[async_trait]
impl LedgerFactory for SqliteLedgerFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and bring
    /// its schema up to date.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"taxtools.db"`. The file is created if it
    ///   does not exist.
    /// * A sqlx URL such as `"sqlite:taxtools.db"`.
    /// * `":memory:"` for an ephemeral database.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculationLedger>, RepositoryError> {
        let ledger = SqliteLedger::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{:#}", e)))?;
        ledger
            .run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        Ok(Box::new(ledger))
    }
}
