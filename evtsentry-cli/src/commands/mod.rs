//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod collect;
pub mod config;
pub mod parse;
pub mod run;
pub mod stats;

use std::path::Path;

use evtsentry_core::config::{EvtsentryConfig, GeneralConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::logging;
use crate::output::OutputWriter;

/// Initialise tracing and execute the selected subcommand.
///
/// `config` reports on the configuration file itself, so it runs with
/// default logging instead of failing on the load it is meant to check.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Config(args) => {
            logging::init_tracing(&GeneralConfig::default(), log_level)?;
            config::execute(args, &cli.config, &writer).await
        }
        Commands::Parse(args) => {
            let config = load_config(&cli.config, log_level).await?;
            parse::execute(args, &config, &writer).await
        }
        Commands::Analyze(args) => {
            let config = load_config(&cli.config, log_level).await?;
            analyze::execute(args, &config, &writer).await
        }
        Commands::Run(args) => {
            let config = load_config(&cli.config, log_level).await?;
            run::execute(args, &config, &writer).await
        }
        Commands::Collect(args) => {
            let config = load_config(&cli.config, log_level).await?;
            collect::execute(args, &config, &writer).await
        }
        Commands::Stats(args) => {
            let config = load_config(&cli.config, log_level).await?;
            stats::execute(args, &config, &writer).await
        }
    }
}

async fn load_config(path: &Path, log_level: Option<&str>) -> Result<EvtsentryConfig, CliError> {
    let config = EvtsentryConfig::load_or_default(path).await?;
    logging::init_tracing(&config.general, log_level)?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}
