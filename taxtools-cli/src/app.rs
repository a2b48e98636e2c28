use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use taxtools_core::db::{DbConfig, LedgerRegistry, MemoryLedgerFactory};
use taxtools_core::identity::{FixedIdentity, IdentityProvider};
use taxtools_core::{
    CallerId, EstimatedTaxInput, FallbackPolicy, StandardDeductionInput, TaxTableRegistry,
    TaxToolsService,
};
use taxtools_data::{TableLoaderError, TaxTableLoader};
use taxtools_db_sqlite::SqliteLedgerFactory;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Command, OutputFormat};
use crate::config::{AppConfig, TablesConfig};
use crate::output;

/// Every ledger backend this binary knows about.
pub fn build_ledger_registry() -> LedgerRegistry {
    let mut registry = LedgerRegistry::new();
    registry.register(Box::new(SqliteLedgerFactory));
    registry.register(Box::new(MemoryLedgerFactory));
    registry
}

/// The compiled-in tables with any configured CSV files merged over them.
pub fn build_tables(config: &TablesConfig) -> Result<TaxTableRegistry, TableLoaderError> {
    let mut builder = TaxTableRegistry::builtin().to_builder();
    if config.strict {
        builder = builder.with_policy(FallbackPolicy::strict());
    }
    for path in &config.brackets {
        TaxTableLoader::load_bracket_file(&mut builder, path)?;
    }
    for path in &config.deductions {
        TaxTableLoader::load_deduction_file(&mut builder, path)?;
    }
    Ok(builder.build())
}

/// `--caller` overrides the config file's `caller`.
pub fn resolve_identity(
    cli: &Cli,
    config: &AppConfig,
) -> Result<FixedIdentity> {
    if let Some(caller) = &cli.caller {
        return Ok(FixedIdentity(Some(caller.clone())));
    }
    let caller = config
        .caller
        .as_deref()
        .map(CallerId::new)
        .transpose()
        .context("Invalid caller in config file")?;
    Ok(FixedIdentity(caller))
}

/// `--backend` and `--db` override the `[database]` section.
pub fn db_config(
    cli: &Cli,
    config: &AppConfig,
) -> DbConfig {
    DbConfig {
        backend: cli
            .backend
            .clone()
            .unwrap_or_else(|| config.database.backend.clone()),
        connection_string: cli
            .db
            .clone()
            .unwrap_or_else(|| config.database.connection_string.clone()),
    }
}

/// Runs one command, writing its output to `out`.
///
/// The ledger is only opened when something will be recorded or read, so an
/// anonymous calculation never touches the database.
pub async fn run<W: Write>(
    cli: Cli,
    config: AppConfig,
    out: &mut W,
) -> Result<()> {
    let tables = build_tables(&config.tables).context("Failed to load tax tables")?;
    info!(years = ?tables.supported_years(), "tax tables ready");

    let identity = resolve_identity(&cli, &config)?;
    let caller = identity.resolve_caller_id();

    let history_filter = match &cli.command {
        Command::History { all: true } => Some(None),
        Command::History { all: false } => match &caller {
            Some(caller) => Some(Some(caller.clone())),
            None => bail!("history needs a caller; pass --caller or use --all"),
        },
        _ => None,
    };

    let mut service = TaxToolsService::new(Arc::new(tables));
    if caller.is_some() || history_filter.is_some() {
        let db = db_config(&cli, &config);
        debug!(backend = %db.backend, "opening ledger");
        match build_ledger_registry().create(&db).await {
            Ok(ledger) => service = service.with_ledger(Arc::from(ledger)),
            // history reads the ledger, so it cannot run without one
            Err(error) if history_filter.is_some() => {
                return Err(error).with_context(|| {
                    format!(
                        "Failed to open {} ledger '{}'",
                        db.backend, db.connection_string
                    )
                });
            }
            Err(error) => warn!(
                backend = %db.backend,
                connection = %db.connection_string,
                %error,
                "ledger unavailable, calculation will not be recorded"
            ),
        }
    }

    let outcome = execute(&service, caller, history_filter, cli.command, cli.format, out).await;
    let recorded = service.flush().await;
    debug!(recorded, "ledger appends finished");
    outcome
}

async fn execute<W: Write>(
    service: &TaxToolsService,
    caller: Option<CallerId>,
    history_filter: Option<Option<CallerId>>,
    command: Command,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Deduction(args) => {
            let result = service.standard_deduction(
                caller,
                StandardDeductionInput {
                    filing_status: args.status,
                    tax_year: args.year,
                    age_65_or_older: args.age_65,
                    blind: args.blind,
                },
            )?;
            output::deduction(out, format, &result)?;
        }
        Command::Estimate(args) => {
            let result = service.estimated_tax(
                caller,
                EstimatedTaxInput {
                    income: args.income,
                    filing_status: args.status,
                    deductions: args.deductions,
                    tax_year: args.year,
                },
            )?;
            output::estimate(out, format, &result)?;
        }
        Command::DueDates { year } => {
            output::due_dates(out, format, &service.due_dates(year))?;
        }
        Command::History { .. } => {
            let ledger = service.ledger().context("no ledger configured")?;
            let filter = history_filter.flatten();
            let records = ledger
                .list_records(filter.as_ref())
                .await
                .context("Failed to read calculation history")?;
            output::history(out, format, &records)?;
        }
        Command::Tables => {
            output::tables(out, format, service.tables())?;
        }
    }
    Ok(())
}
