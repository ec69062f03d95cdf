//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// evtsentry -- Windows security event log ingestion and alerting.
///
/// Use `evtsentry <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "evtsentry", version, about, long_about = None)]
pub struct Cli {
    /// Path to the evtsentry.toml configuration file.
    #[arg(short, long, global = true, default_value = "evtsentry.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize an .evtx file into the events CSV.
    Parse(ParseArgs),

    /// Evaluate detection rules over the events CSV and write alerts.
    Analyze(AnalyzeArgs),

    /// Parse an .evtx file and analyze it in one pass.
    Run(RunArgs),

    /// Poll a Windows Event Forwarding endpoint until interrupted.
    Collect(CollectArgs),

    /// Summarize the events CSV.
    Stats(StatsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Normalize an .evtx file.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Path to the .evtx file.
    pub input: PathBuf,

    /// Events CSV destination (default: `[batch] events_file` under `data_dir`).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

// ---- analyze ----

/// Run the alert engine over a previously written events CSV.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Events CSV to read (default: `[batch] events_file` under `data_dir`).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Alerts CSV destination (default: `[batch] alerts_file` under `data_dir`).
    #[arg(long)]
    pub alerts: Option<PathBuf>,

    /// Rule document (default: `[batch] rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

// ---- run ----

/// Parse and analyze without re-reading the events CSV.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the .evtx file.
    pub input: PathBuf,

    /// Rule document (default: `[batch] rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

// ---- collect ----

/// Live collection from a WEF subscription.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Override the poll interval in seconds.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Perform a single pull exchange and exit.
    #[arg(long)]
    pub once: bool,
}

// ---- stats ----

/// Summary statistics over the events CSV.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Events CSV to read (default: `[batch] events_file` under `data_dir`).
    #[arg(long)]
    pub events: Option<PathBuf>,
}

// ---- config ----

/// Manage evtsentry configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, batch, collector).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_parse_with_defaults() {
        let cli = Cli::try_parse_from(["evtsentry", "parse", "Security.evtx"])
            .expect("should parse 'parse' subcommand");
        assert_eq!(cli.config, PathBuf::from("evtsentry.toml"));
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.input, PathBuf::from("Security.evtx"));
                assert!(args.out.is_none(), "out should default to None");
            }
            _ => panic!("expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parse_parse_requires_input() {
        let result = Cli::try_parse_from(["evtsentry", "parse"]);
        assert!(result.is_err(), "parse without input should fail");
    }

    #[test]
    fn test_cli_parse_parse_with_out() {
        let cli = Cli::try_parse_from([
            "evtsentry",
            "parse",
            "Security.evtx",
            "--out",
            "/tmp/events.csv",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.out, Some(PathBuf::from("/tmp/events.csv")));
            }
            _ => panic!("expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_overrides() {
        let cli = Cli::try_parse_from([
            "evtsentry",
            "analyze",
            "--events",
            "e.csv",
            "--alerts",
            "a.csv",
            "--rules",
            "rules.yaml",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.events, Some(PathBuf::from("e.csv")));
                assert_eq!(args.alerts, Some(PathBuf::from("a.csv")));
                assert_eq!(args.rules, Some(PathBuf::from("rules.yaml")));
            }
            _ => panic!("expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_run() {
        let cli =
            Cli::try_parse_from(["evtsentry", "run", "Security.evtx"]).expect("parse succeeded");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.input, PathBuf::from("Security.evtx"));
                assert!(args.rules.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_collect_once_with_interval() {
        let cli = Cli::try_parse_from(["evtsentry", "collect", "--once", "--interval", "5"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Collect(args) => {
                assert!(args.once);
                assert_eq!(args.interval, Some(5));
            }
            _ => panic!("expected Collect command"),
        }
    }

    #[test]
    fn test_cli_parse_collect_rejects_negative_interval() {
        let result = Cli::try_parse_from(["evtsentry", "collect", "--interval", "-1"]);
        assert!(result.is_err(), "negative interval should be rejected");
    }

    #[test]
    fn test_cli_parse_stats() {
        let cli = Cli::try_parse_from(["evtsentry", "stats", "--events", "live.csv"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Stats(args) => {
                assert_eq!(args.events, Some(PathBuf::from("live.csv")));
            }
            _ => panic!("expected Stats command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let cli = Cli::try_parse_from(["evtsentry", "config", "show", "--section", "collector"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Config(args) => match args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section.as_deref(), Some("collector"));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "evtsentry",
            "stats",
            "--output",
            "json",
            "--log-level",
            "debug",
            "--config",
            "/etc/evtsentry.toml",
        ])
        .expect("parse succeeded");
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, PathBuf::from("/etc/evtsentry.toml"));
    }

    #[test]
    fn test_cli_parse_invalid_output_format() {
        let result = Cli::try_parse_from(["evtsentry", "--output", "xml", "stats"]);
        assert!(result.is_err(), "unknown output format should fail");
    }

    #[test]
    fn test_cli_parse_no_subcommand_fails() {
        let result = Cli::try_parse_from(["evtsentry"]);
        assert!(result.is_err(), "missing subcommand should fail");
    }
}
