//! SQLite backend for the calculation ledger.

mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteLedgerFactory;
pub use repository::SqliteLedger;
