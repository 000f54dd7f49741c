//! Diagnostic logging for the CLI
//!
//! Operator-facing progress goes to stdout. Diagnostics go through `tracing`
//! to stderr, filtered by `RELEASE_LOG` or the `--log-level` flag.

use std::io;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Filter variable, takes precedence over `--log-level`
pub const LOG_ENV: &str = "RELEASE_LOG";

/// Log level options for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    /// Default
    #[default]
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

static RUN_ID: OnceLock<Uuid> = OnceLock::new();

/// Identifier of this release run
pub fn run_id() -> Uuid {
    *RUN_ID.get_or_init(Uuid::new_v4)
}

/// Filter directive for `level` when `RELEASE_LOG` is not set
pub fn default_directive(level: LogLevel) -> String {
    let level = Level::from(level).as_str().to_ascii_lowercase();
    format!("release_publisher={level}")
}

/// Install the global subscriber
pub fn init(level: LogLevel) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(level))
            .map_err(|e| anyhow::anyhow!("invalid log filter: {e}"))?,
    };

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(LogLevel::Warn), "release_publisher=warn");
        assert_eq!(default_directive(LogLevel::Trace), "release_publisher=trace");
    }

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(LogLevel::default(), LogLevel::Warn);
    }

    #[test]
    fn test_run_id_is_stable() {
        assert_eq!(run_id(), run_id());
    }
}
