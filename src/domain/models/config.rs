//! Top-level configuration structure for Marcus.

use serde::{Deserialize, Serialize};

/// Main configuration structure for Marcus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Which kanban provider to use (opaque identifier; concrete backends are
    /// out of scope for the core — see `spec.md` §1).
    #[serde(default = "default_kanban_provider")]
    pub kanban_provider: String,

    /// Ledger, monitor-snapshot, and realtime-log file locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retry policy defaults for the error substrate (§4.1).
    #[serde(default)]
    pub retry: RetryConfig,

    /// Circuit breaker defaults (§4.1).
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    /// Error monitor thresholds (§4.2).
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Rate limit applied to outbound kanban/AI calls.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Reconciliation monitor period and heartbeat bounds (§4.9).
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    /// Per-call timeouts (§5).
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

fn default_kanban_provider() -> String {
    "planka".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kanban_provider: default_kanban_provider(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            monitor: MonitorConfig::default(),
            rate_limit: RateLimitConfig::default(),
            reconciliation: ReconciliationConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,
    #[serde(default = "default_monitor_snapshot_path")]
    pub monitor_snapshot_path: String,
    #[serde(default = "default_realtime_log_path")]
    pub realtime_log_path: String,
}

fn default_ledger_path() -> String {
    ".marcus/ledger.json".to_string()
}
fn default_monitor_snapshot_path() -> String {
    ".marcus/monitor_snapshot.json".to_string()
}
fn default_realtime_log_path() -> String {
    ".marcus/realtime.jsonl".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            monitor_snapshot_path: default_monitor_snapshot_path(),
            realtime_log_path: default_realtime_log_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

const fn default_max_attempts() -> u32 {
    3
}
const fn default_base_delay_ms() -> u64 {
    200
}
const fn default_max_delay_ms() -> u64 {
    10_000
}
const fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    #[serde(default = "default_open_timeout_secs")]
    pub open_timeout_secs: u64,
    #[serde(default = "default_monitor_window_secs")]
    pub monitor_window_secs: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}
const fn default_success_threshold() -> u32 {
    2
}
const fn default_open_timeout_secs() -> u64 {
    60
}
const fn default_monitor_window_secs() -> u64 {
    600
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            open_timeout_secs: default_open_timeout_secs(),
            monitor_window_secs: default_monitor_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_frequency_threshold")]
    pub frequency_threshold: u32,
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: u32,
    #[serde(default = "default_agent_error_threshold")]
    pub agent_error_threshold: u32,
    #[serde(default = "default_cascade_threshold")]
    pub cascade_threshold: u32,
    #[serde(default = "default_correlation_timeout_minutes")]
    pub correlation_timeout_minutes: i64,
}

const fn default_history_capacity() -> usize {
    10_000
}
const fn default_frequency_threshold() -> u32 {
    10
}
const fn default_burst_threshold() -> u32 {
    15
}
const fn default_agent_error_threshold() -> u32 {
    5
}
const fn default_cascade_threshold() -> u32 {
    5
}
const fn default_correlation_timeout_minutes() -> i64 {
    15
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            frequency_threshold: default_frequency_threshold(),
            burst_threshold: default_burst_threshold(),
            agent_error_threshold: default_agent_error_threshold(),
            cascade_threshold: default_cascade_threshold(),
            correlation_timeout_minutes: default_correlation_timeout_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    10.0
}
const fn default_burst_size() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconciliationConfig {
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    #[serde(default = "default_heartbeat_floor_secs")]
    pub heartbeat_timeout_floor_secs: i64,
    #[serde(default = "default_heartbeat_ceiling_secs")]
    pub heartbeat_timeout_ceiling_secs: i64,
}

const fn default_tick_secs() -> u64 {
    60
}
const fn default_heartbeat_floor_secs() -> i64 {
    30 * 60
}
const fn default_heartbeat_ceiling_secs() -> i64 {
    24 * 60 * 60
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            heartbeat_timeout_floor_secs: default_heartbeat_floor_secs(),
            heartbeat_timeout_ceiling_secs: default_heartbeat_ceiling_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    #[serde(default = "default_kanban_timeout_secs")]
    pub kanban_call_secs: u64,
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_call_secs: u64,
}

const fn default_kanban_timeout_secs() -> u64 {
    30
}
const fn default_ai_timeout_secs() -> u64 {
    60
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            kanban_call_secs: default_kanban_timeout_secs(),
            ai_call_secs: default_ai_timeout_secs(),
        }
    }
}
