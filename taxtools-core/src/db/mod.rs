pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, LedgerFactory, LedgerRegistry};
pub use memory::{MemoryLedger, MemoryLedgerFactory};
pub use repository::{CalculationLedger, RepositoryError};
