//! Logging initialization for the evtsentry CLI.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `EvtsentryConfig`. Log lines go to stderr; stdout carries command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use evtsentry_core::config::GeneralConfig;

use crate::error::CliError;

/// Initialize the global tracing subscriber.
///
/// Must be called once, before any tracing macros are used.
///
/// Filter precedence: `--log-level` flag, then `RUST_LOG`, then
/// `general.log_level`.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (default)
/// * `"pretty"` - Human-readable multi-line output
pub fn init_tracing(config: &GeneralConfig, level_override: Option<&str>) -> Result<(), CliError> {
    let env_filter = build_filter(config, level_override)?;

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| {
                CliError::Command(format!("failed to initialize JSON tracing subscriber: {e}"))
            }),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| {
                CliError::Command(format!("failed to initialize pretty tracing subscriber: {e}"))
            }),
        other => Err(CliError::Config(format!(
            "unknown log format '{other}', expected 'json' or 'pretty'"
        ))),
    }
}

fn build_filter(
    config: &GeneralConfig,
    level_override: Option<&str>,
) -> Result<EnvFilter, CliError> {
    if let Some(level) = level_override {
        return EnvFilter::try_new(level)
            .map_err(|e| CliError::Config(format!("invalid --log-level '{level}': {e}")));
    }

    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
}
