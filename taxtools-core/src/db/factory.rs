use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::repository::{CalculationLedger, RepositoryError};

/// Backend-agnostic ledger connection configuration.
///
/// `backend` must match the [`LedgerFactory::backend_name`] of a
/// registered factory.  `connection_string` is passed through to that
/// factory unchanged; its meaning is entirely backend-specific.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `taxtools.db`, `:memory:`           |
/// | `memory`   | ignored                             |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"sqlite"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "taxtools.db".to_string(),
        }
    }
}

/// One implementation per ledger backend.  Each backend exports a single
/// unit struct that implements this trait and is registered with a
/// [`LedgerRegistry`] at startup.
#[async_trait]
pub trait LedgerFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Open (or create) the store and return a ready-to-use ledger.
    /// Implementations are free to run migrations inside this method.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculationLedger>, RepositoryError>;
}

/// Registry of [`LedgerFactory`] instances, keyed by backend name.
pub struct LedgerRegistry {
    factories: HashMap<&'static str, Box<dyn LedgerFactory>>,
}

impl LedgerRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend factory.
    ///
    /// If a factory with the same [`LedgerFactory::backend_name`] is
    /// already present it is silently replaced.
    pub fn register(
        &mut self,
        factory: Box<dyn LedgerFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] if no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn CalculationLedger>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for LedgerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
