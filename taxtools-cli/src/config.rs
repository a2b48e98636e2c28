//! `taxtools.toml` configuration.
//!
//! ```toml
//! caller = "client-42"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "taxtools.db"
//!
//! [logging]
//! level = "info"
//! file = "taxtools.log"
//!
//! [tables]
//! brackets = ["tables/brackets_2025.csv"]
//! deductions = ["tables/deductions_2025.csv"]
//! strict = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use taxtools_core::db::DbConfig;
use thiserror::Error;

pub const CONFIG_ENV: &str = "TAXTOOLS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "taxtools.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Identity recorded with each calculation. Absent means anonymous.
    pub caller: Option<String>,
    pub database: DbConfig,
    pub logging: LoggingConfig,
    pub tables: TablesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Bare level or any `EnvFilter` directive.
    pub level: String,
    /// Append log records to this file in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Extra table files merged over the compiled-in 2023 and 2024 tables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablesConfig {
    pub brackets: Vec<PathBuf>,
    pub deductions: Vec<PathBuf>,
    /// Refuse lookups that would otherwise fall back to another year or
    /// status.
    pub strict: bool,
}

impl AppConfig {
    pub fn from_toml_str(
        path: &Path,
        contents: &str,
    ) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(path, &contents)
    }

    /// Loads the config file chosen by [`resolve_path`], or defaults when
    /// there is none. Returns the path that was read.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let env_value = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        let fallback = fallback.is_file().then(|| fallback.to_path_buf());

        match resolve_path(explicit, env_value, fallback) {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

/// `--config` wins over `TAXTOOLS_CONFIG`, which wins over `./taxtools.toml`.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_value: Option<PathBuf>,
    default_file: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(env_value.filter(|p| !p.as_os_str().is_empty()))
        .or(default_file)
}
