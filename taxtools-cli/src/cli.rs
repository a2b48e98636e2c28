use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use taxtools_core::{CallerId, FilingStatus};

use crate::utils::parse_decimal;

/// Standard deduction, bracket tax estimate and filing deadlines.
///
/// Calculations made with a caller identity are appended to the ledger.
#[derive(Debug, Parser)]
#[command(name = "taxtools", version)]
pub struct Cli {
    /// Config file. Defaults to $TAXTOOLS_CONFIG, then ./taxtools.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Identity to record calculations under. Overrides `caller` in the
    /// config file.
    #[arg(long, global = true)]
    pub caller: Option<CallerId>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level or EnvFilter directive. Overrides RUST_LOG and the config.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Ledger backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Ledger connection string. For SQLite a file path or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Standard deduction for a filing status and year.
    Deduction(DeductionArgs),
    /// Estimated federal income tax from the bracket tables.
    Estimate(EstimateArgs),
    /// Filing and estimated-payment deadlines for a tax year.
    DueDates {
        #[arg(long)]
        year: i32,
    },
    /// Calculations recorded for the caller, oldest first.
    History {
        /// Every caller's records.
        #[arg(long)]
        all: bool,
    },
    /// Tax years and statuses the loaded tables cover.
    Tables,
}

#[derive(Debug, Args)]
pub struct DeductionArgs {
    /// single, marriedFilingJointly, marriedFilingSeparately, headOfHousehold
    /// or S, MFJ, MFS, HOH.
    #[arg(long)]
    pub status: FilingStatus,

    #[arg(long)]
    pub year: i32,

    /// Taxpayer is 65 or older.
    #[arg(long)]
    pub age_65: bool,

    #[arg(long)]
    pub blind: bool,
}

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Gross income; `50,000` and `$50000` are accepted.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_decimal)]
    pub income: Decimal,

    #[arg(long)]
    pub status: FilingStatus,

    #[arg(long, default_value = "0", allow_negative_numbers = true, value_parser = parse_decimal)]
    pub deductions: Decimal,

    #[arg(long)]
    pub year: i32,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_estimate_with_short_status_code() {
        let cli = Cli::try_parse_from([
            "taxtools", "estimate", "--income", "50,000", "--status", "MFJ", "--year", "2024",
        ])
        .unwrap();

        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate, got {:?}", cli.command);
        };
        assert_eq!(args.income, dec!(50000));
        assert_eq!(args.status, FilingStatus::MarriedFilingJointly);
        assert_eq!(args.deductions, dec!(0));
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "taxtools", "deduction", "--status", "single", "--year", "2023", "--age-65",
            "--caller", "client-1", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.caller, Some(CallerId::new("client-1").unwrap()));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = Cli::try_parse_from([
            "taxtools", "deduction", "--status", "widowed", "--year", "2023",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn blank_caller_is_rejected() {
        let result = Cli::try_parse_from(["taxtools", "tables", "--caller", "  "]);

        assert!(result.is_err());
    }
}
