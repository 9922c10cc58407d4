//! Command-line flags, grounded on the teacher's `cli::types::Cli`
//! (`src/cli/types.rs`). Marcus has no subcommand surface — the whole binary
//! is the MCP stdio server, so this is a flat flag set rather than the
//! teacher's `Commands` enum.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marcus")]
#[command(about = "Marcus - multi-agent task coordination server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the project config YAML (defaults to `.marcus/config.yaml` via
    /// `ConfigLoader::load`; when set, loads this file instead).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override `storage.ledger_path`.
    #[arg(long)]
    pub ledger_path: Option<PathBuf>,

    /// Override `storage.realtime_log_path`.
    #[arg(long)]
    pub realtime_log_path: Option<PathBuf>,

    /// Override `logging.level` (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override `logging.format` (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// Override `logging.log_dir`; when set, logs also roll daily to this
    /// directory in addition to stderr.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Override `circuit_breaker.failure_threshold`.
    #[arg(long)]
    pub failure_threshold: Option<u32>,

    /// Override `reconciliation.tick_secs`.
    #[arg(long)]
    pub reconciliation_tick_secs: Option<u64>,
}

impl Cli {
    /// Apply any flags the caller set over a loaded `Config`.
    pub fn apply_overrides(&self, config: &mut crate::domain::models::Config) {
        if let Some(path) = &self.ledger_path {
            config.storage.ledger_path = path.display().to_string();
        }
        if let Some(path) = &self.realtime_log_path {
            config.storage.realtime_log_path = path.display().to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.logging.log_dir = Some(dir.display().to_string());
        }
        if let Some(threshold) = self.failure_threshold {
            config.circuit_breaker.failure_threshold = threshold;
        }
        if let Some(secs) = self.reconciliation_tick_secs {
            config.reconciliation.tick_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn overrides_apply_onto_default_config() {
        let cli = Cli {
            config: None,
            ledger_path: Some(PathBuf::from("/tmp/ledger.json")),
            realtime_log_path: None,
            log_level: Some("debug".to_string()),
            log_format: None,
            log_dir: None,
            failure_threshold: Some(9),
            reconciliation_tick_secs: None,
        };
        let mut config = crate::domain::models::Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.storage.ledger_path, "/tmp/ledger.json");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.circuit_breaker.failure_threshold, 9);
    }
}
