//! `evtsentry stats` command handler

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use evtsentry_core::config::EvtsentryConfig;
use evtsentry_log_pipeline::{EventSummary, reader};

use crate::cli::StatsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `stats` command.
///
/// A missing events file yields an all-zero summary.
pub async fn execute(
    args: StatsArgs,
    config: &EvtsentryConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = args.events.unwrap_or_else(|| config.events_path());
    let records = reader::read_events(&source)?;

    let report = StatsReport {
        source,
        summary: EventSummary::from_records(&records),
    };
    writer.render(&report)
}

#[derive(Serialize)]
pub struct StatsReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub summary: EventSummary,
}

impl Render for StatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Event Summary: {}", self.source.display().to_string().bold())?;
        writeln!(w, "  Total events:    {}", self.summary.total_events)?;
        writeln!(w, "  Unique users:    {}", self.summary.unique_users)?;
        writeln!(w, "  Critical events: {}", self.summary.critical_events)?;

        if self.summary.logins_by_hour.is_empty() {
            return Ok(());
        }
        writeln!(w, "  Logins by hour:")?;
        for (hour, count) in &self.summary.logins_by_hour {
            writeln!(w, "    {:02}:00  {}", hour, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stats_report_render_text() {
        let report = StatsReport {
            source: PathBuf::from("data/events.csv"),
            summary: EventSummary {
                total_events: 7,
                unique_users: 3,
                critical_events: 5,
                logins_by_hour: BTreeMap::from([(3, 1), (9, 4)]),
            },
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Total events:    7"));
        assert!(output.contains("Unique users:    3"));
        assert!(output.contains("03:00  1"));
        assert!(output.contains("09:00  4"));
    }

    #[test]
    fn test_stats_report_empty_omits_hours() {
        let report = StatsReport {
            source: PathBuf::from("data/events.csv"),
            summary: EventSummary::default(),
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(!output.contains("Logins by hour"));
    }
}
