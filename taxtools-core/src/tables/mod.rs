//! Versioned tax tables and the fallback policy applied when a lookup misses.

mod builtin;
mod registry;

pub use registry::{
    AppliedFallback, BracketLookup, BracketStatusFallback, BracketYearFallback,
    DeductionFallback, DeductionLookup, FallbackPolicy, TableLookupError, TaxTableRegistry,
    TaxTableRegistryBuilder, TaxYearTables,
};
