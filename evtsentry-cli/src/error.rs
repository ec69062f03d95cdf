//! CLI-specific error types and exit code mapping

use evtsentry_core::error::{ConfigError, EvtsentryError, PipelineError};
use evtsentry_log_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from evtsentry-core.
    #[error("{0}")]
    Core(#[from] EvtsentryError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | General / command error                  |
    /// | 2    | Configuration or rule document error     |
    /// | 3    | Input source unreadable                  |
    /// | 5    | Output file could not be written         |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                EvtsentryError::Config(_) => 2,
                EvtsentryError::Pipeline(PipelineError::SourceUnreadable(_)) => 3,
                EvtsentryError::Pipeline(PipelineError::SinkWrite(_)) => 5,
                EvtsentryError::Io(_) => 10,
                EvtsentryError::Pipeline(_) | EvtsentryError::Parse(_) => 1,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        Self::Core(e.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("No events to analyze".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_missing_rules() {
        let err: CliError = LogPipelineError::RuleMissing("config/rules.json".to_owned()).into();
        assert_eq!(err.exit_code(), 2, "missing rules should be a config error");
    }

    #[test]
    fn test_exit_code_invalid_rules() {
        let err: CliError = LogPipelineError::RuleLoad {
            path: "rules.json".to_owned(),
            reason: "expected value at line 1".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);

        let err: CliError = LogPipelineError::Config {
            field: "after_hours_window.start".to_owned(),
            reason: "must be between 0 and 23".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_source_unreadable() {
        let err: CliError = LogPipelineError::SourceUnreadable {
            path: "Security.evtx".to_owned(),
            reason: "invalid file header".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_sink_write() {
        let err: CliError = LogPipelineError::SinkWrite {
            path: "/readonly/alerts.csv".to_owned(),
            reason: "permission denied".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exit_code_collector_failure_is_general() {
        let err: CliError = LogPipelineError::Network("connection refused".to_owned()).into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_missing_config_file() {
        let err: CliError = ConfigError::FileNotFound {
            path: "evtsentry.toml".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_error_display_keeps_domain_message() {
        let err: CliError = LogPipelineError::SourceUnreadable {
            path: "Security.evtx".to_owned(),
            reason: "invalid file header".to_owned(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Security.evtx"), "message should name the file");
    }
}
