//! `evtsentry collect` command handler

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use evtsentry_core::config::EvtsentryConfig;
use evtsentry_log_pipeline::{CollectorStats, LiveCollector, LiveCollectorConfig, ReqwestTransport};

use crate::cli::CollectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `collect` command.
///
/// Without `--once` the collector polls until Ctrl-C. An exchange already in
/// flight when the signal arrives is allowed to finish or time out.
pub async fn execute(
    args: CollectArgs,
    config: &EvtsentryConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let collector_config = collector_config(config, args.interval)?;
    let transport = ReqwestTransport::new(&collector_config)?;
    let output = collector_config.output_path.clone();
    let url = transport.url().to_owned();

    let cancel = CancellationToken::new();
    let mut collector = LiveCollector::new(collector_config, transport, cancel.clone());

    let stats = if args.once {
        collector.restore_cursor().await;
        let events = collector.poll_once().await?;
        CollectorStats {
            polls: 1,
            failures: 0,
            events: events as u64,
        }
    } else {
        let signal = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c, stopping"),
            }
            cancel.cancel();
        });
        let stats = collector.run().await;
        signal.abort();
        stats
    };

    let report = CollectReport {
        url,
        output,
        context: collector.context().to_owned(),
        stats,
    };
    writer.render(&report)
}

/// Build the collector settings, applying the `--interval` override.
fn collector_config(
    config: &EvtsentryConfig,
    interval: Option<u64>,
) -> Result<LiveCollectorConfig, CliError> {
    let mut collector_config = LiveCollectorConfig::from_core(config);
    if let Some(secs) = interval {
        collector_config.poll_interval = Duration::from_secs(secs);
    }
    collector_config.validate()?;
    Ok(collector_config)
}

/// Summary printed when collection stops.
#[derive(Serialize)]
pub struct CollectReport {
    pub url: String,
    pub output: PathBuf,
    /// Enumeration context at exit
    pub context: String,
    #[serde(flatten)]
    pub stats: CollectorStats,
}

impl Render for CollectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Collected from {}", self.url.bold())?;
        writeln!(w, "  Polls:    {}", self.stats.polls)?;
        if self.stats.failures > 0 {
            writeln!(w, "  Failures: {}", self.stats.failures.to_string().red())?;
        } else {
            writeln!(w, "  Failures: 0")?;
        }
        writeln!(w, "  Events:   {}", self.stats.events)?;
        writeln!(w, "  Context:  {}", self.context)?;
        writeln!(w, "  Output:   {}", self.output.display())?;
        Ok(())
    }
}
