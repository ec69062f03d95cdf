//! `evtsentry parse` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use evtsentry_core::config::EvtsentryConfig;
use evtsentry_log_pipeline::{BatchLogParser, ParseStats};

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
///
/// Decoding runs on the blocking pool; the events CSV is replaced only
/// after every record has been read.
pub async fn execute(
    args: ParseArgs,
    config: &EvtsentryConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let output = args.out.unwrap_or_else(|| config.events_path());
    info!(source = %args.input.display(), output = %output.display(), "parsing event log");

    let input = args.input.clone();
    let out = output.clone();
    let outcome =
        tokio::task::spawn_blocking(move || BatchLogParser::new().parse_to_csv(&input, &out))
            .await
            .map_err(|e| CliError::Command(format!("parse task failed: {e}")))??;

    let report = ParseReport {
        source: args.input,
        output,
        stats: outcome.stats,
    };
    writer.render(&report)
}

/// Result of normalizing one .evtx file.
#[derive(Serialize)]
pub struct ParseReport {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: ParseStats,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Parsed {}", self.source.display().to_string().bold())?;
        writeln!(w, "  Records: {}", self.stats.total)?;
        writeln!(w, "  Parsed:  {}", self.stats.parsed.to_string().green())?;
        if self.stats.skipped > 0 {
            writeln!(w, "  Skipped: {}", self.stats.skipped.to_string().yellow())?;
        } else {
            writeln!(w, "  Skipped: 0")?;
        }
        writeln!(w, "  Output:  {}", self.output.display())?;
        Ok(())
    }
}
