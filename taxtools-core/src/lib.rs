pub mod calculations;
pub mod db;
pub mod identity;
pub mod models;
pub mod service;
pub mod tables;

pub use calculations::{
    EstimatedTaxInput, EstimatedTaxResult, StandardDeductionInput, StandardDeductionResult,
};
pub use db::{CalculationLedger, RepositoryError};
pub use identity::IdentityProvider;
pub use models::*;
pub use service::{CalculationError, TaxToolsService};
pub use tables::{AppliedFallback, FallbackPolicy, TableLookupError, TaxTableRegistry};
