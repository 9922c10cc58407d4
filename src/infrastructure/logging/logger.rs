//! Tracing subscriber setup, grounded on the teacher's `LoggerImpl`
//! (`infrastructure/logging/logger.rs`), trimmed to the fields Marcus's
//! `LoggingConfig` actually carries (level, format, optional log_dir).

use crate::domain::models::config::LoggingConfig;
use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Owns the non-blocking writer guard; must stay alive for the process
/// lifetime or buffered log lines are dropped on exit.
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
        let is_json = config.format == "json";

        let guard = if let Some(log_dir) = &config.log_dir {
            let file_appender = rolling::daily(log_dir, "marcus.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_filter(env_filter.clone());

            if is_json {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
            } else {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(file_layer).with(stdout_layer).init();
            }
            Some(guard)
        } else if is_json {
            let stdout_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(stdout_layer).init();
            None
        } else {
            let stdout_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(stdout_layer).init();
            None
        };

        // stdout is reserved for the MCP JSON-RPC stream; all log output goes to stderr.
        tracing::info!(level = %config.level, format = %config.format, "logger initialized");
        Ok(Self { _guard: guard })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!("invalid log level: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_level_accepts_known_levels() {
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("DEBUG"), Ok(Level::DEBUG)));
        assert!(parse_log_level("verbose").is_err());
    }
}
