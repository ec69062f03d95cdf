//! `evtsentry run` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use evtsentry_core::config::EvtsentryConfig;
use evtsentry_log_pipeline::{AlertEngine, BatchPipeline, BatchReport, RuleSet};

use crate::cli::RunArgs;
use crate::commands::analyze::render_alert_counts;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command: parse, persist, then analyze the in-memory records.
pub async fn execute(
    args: RunArgs,
    config: &EvtsentryConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rules_path = args.rules.unwrap_or_else(|| config.rules_path());
    let rules = RuleSet::load(&rules_path).await?;
    let warnings = rules.warnings();

    let pipeline = BatchPipeline::new(
        AlertEngine::new(rules),
        config.events_path(),
        config.alerts_path(),
    );
    info!(source = %args.input.display(), "running batch pipeline");

    let input = args.input.clone();
    let (batch, pipeline) = tokio::task::spawn_blocking(move || {
        let result = pipeline.run(&input);
        (result, pipeline)
    })
    .await
    .map_err(|e| CliError::Command(format!("batch task failed: {e}")))?;
    let batch = batch?;

    let report = RunReport {
        source: args.input,
        events_output: pipeline.events_path().to_path_buf(),
        alerts_output: pipeline.alerts_path().to_path_buf(),
        rule_warnings: warnings,
        batch,
    };
    writer.render(&report)
}

/// Result of a combined parse and analyze pass.
#[derive(Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub events_output: PathBuf,
    pub alerts_output: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_warnings: Vec<String>,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Processed {}", self.source.display().to_string().bold())?;
        if let Some(stats) = &self.batch.parse {
            writeln!(
                w,
                "  Records: {} ({} parsed, {} skipped)",
                stats.total, stats.parsed, stats.skipped
            )?;
        }
        writeln!(w, "  Events file: {}", self.events_output.display())?;
        render_alert_counts(w, self.batch.alerts, &self.batch.alerts_by_kind)?;
        for warning in &self.rule_warnings {
            writeln!(w, "  Warning: {}", warning.yellow())?;
        }
        writeln!(w, "  Alerts file: {}", self.alerts_output.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtsentry_log_pipeline::ParseStats;
    use std::collections::BTreeMap;

    fn report(rule_warnings: Vec<String>) -> RunReport {
        RunReport {
            source: PathBuf::from("Security.evtx"),
            events_output: PathBuf::from("data/events.csv"),
            alerts_output: PathBuf::from("data/alerts.csv"),
            rule_warnings,
            batch: BatchReport {
                parse: Some(ParseStats {
                    total: 5,
                    parsed: 4,
                    skipped: 1,
                }),
                events: 4,
                alerts: 1,
                alerts_by_kind: BTreeMap::from([("USB Device Access".to_owned(), 1)]),
            },
        }
    }

    #[test]
    fn test_run_report_render_text_includes_parse_stats() {
        let report = report(Vec::new());

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Records: 5 (4 parsed, 1 skipped)"));
        assert!(output.contains("USB Device Access"));
        assert!(output.contains("data/events.csv"));
    }

    #[test]
    fn test_run_report_carries_rule_warnings() {
        let report = report(vec![
            "after_hours_window start 22 is after end 5; the window never matches".to_owned(),
        ]);

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Warning:"));
        assert!(output.contains("never matches"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rule_warnings"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["alerts"], 1);
    }

    #[test]
    fn test_run_report_json_omits_empty_warnings() {
        let json = serde_json::to_value(report(Vec::new())).unwrap();
        assert!(json.get("rule_warnings").is_none());
    }
}
