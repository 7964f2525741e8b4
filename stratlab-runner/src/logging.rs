//! Tracing subscriber setup for binaries.
//!
//! The filter comes from `STRATLAB_LOG` when set, otherwise from the level
//! passed in (typically the CLI `--log-level` flag).

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "STRATLAB_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected plain or json)")),
        }
    }
}

fn env_filter(log_level: &str) -> Result<EnvFilter, String> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    EnvFilter::try_new(filter).map_err(|err| format!("invalid log filter: {err}"))
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for results.
pub fn init_tracing(log_level: &str, format: LogFormat) -> Result<(), String> {
    let filter = env_filter(log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Plain => builder.try_init(),
    };
    installed.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}
