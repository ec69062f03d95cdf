//! `evtsentry analyze` command handler

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use evtsentry_core::config::EvtsentryConfig;
use evtsentry_log_pipeline::{AlertEngine, BatchPipeline, BatchReport, RuleSet, reader};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `analyze` command.
///
/// Rules are loaded before the events file so that a missing rule
/// document fails the run even when there is nothing to analyze.
///
/// # Errors
///
/// Returns `CliError::Command` when the events file yields no records.
pub async fn execute(
    args: AnalyzeArgs,
    config: &EvtsentryConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rules_path = args.rules.unwrap_or_else(|| config.rules_path());
    let events_path = args.events.unwrap_or_else(|| config.events_path());
    let alerts_path = args.alerts.unwrap_or_else(|| config.alerts_path());

    let rules = RuleSet::load(&rules_path).await?;
    let warnings = rules.warnings();

    info!(events = %events_path.display(), "loading events");
    let records = reader::read_events(&events_path)?;
    if records.is_empty() {
        return Err(CliError::Command("No events to analyze".to_owned()));
    }

    let pipeline = BatchPipeline::new(AlertEngine::new(rules), &events_path, &alerts_path);
    let batch = pipeline.analyze(&records)?;

    let report = AnalyzeReport {
        events_source: events_path,
        alerts_output: alerts_path,
        rule_warnings: warnings,
        batch,
    };
    writer.render(&report)
}

/// Result of one alerting pass.
#[derive(Serialize)]
pub struct AnalyzeReport {
    pub events_source: PathBuf,
    pub alerts_output: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_warnings: Vec<String>,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Analyzed {} events", self.batch.events)?;
        render_alert_counts(w, self.batch.alerts, &self.batch.alerts_by_kind)?;
        for warning in &self.rule_warnings {
            use colored::Colorize;
            writeln!(w, "  Warning: {}", warning.yellow())?;
        }
        writeln!(w, "  Alerts file: {}", self.alerts_output.display())?;
        Ok(())
    }
}

/// Alert totals shared by `analyze` and `run`.
pub(crate) fn render_alert_counts(
    w: &mut dyn Write,
    total: usize,
    by_kind: &BTreeMap<String, usize>,
) -> std::io::Result<()> {
    use colored::Colorize;

    if total == 0 {
        writeln!(w, "  Alerts: {}", "0".green())?;
        return Ok(());
    }

    writeln!(w, "  Alerts: {}", total.to_string().red().bold())?;
    for (kind, count) in by_kind {
        writeln!(w, "    {:<20} {}", kind, count)?;
    }
    Ok(())
}
