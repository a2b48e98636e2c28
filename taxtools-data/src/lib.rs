pub mod loader;

pub use loader::{BracketRecord, DeductionRecord, TableLoaderError, TaxTableLoader};
