use std::io::{self, Write};

use clap::Parser;
use tracing::{debug, info};

use taxtools_cli::app;
use taxtools_cli::cli::Cli;
use taxtools_cli::config::AppConfig;
use taxtools_cli::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = AppConfig::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref(), &config.logging)?;

    match &config_path {
        Some(path) => info!("using config file '{}'", path.display()),
        None => debug!("no config file, using defaults"),
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    app::run(cli, config, &mut out).await?;
    out.flush()?;

    Ok(())
}
