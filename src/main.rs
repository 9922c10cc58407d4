//! Marcus process entry point: loads configuration, initializes logging,
//! wires the coordination core together, and runs the stdio MCP dispatcher
//! loop. Grounded on the teacher's `main.rs` wiring sequence (config load,
//! then repositories/services, then dispatch), adapted from the teacher's
//! subcommand dispatch to Marcus's single stdio-server mode.

use anyhow::{Context, Result};
use clap::Parser;
use marcus::adapters::ai::MockAiAdapter;
use marcus::adapters::kanban::InMemoryKanban;
use marcus::cli::Cli;
use marcus::coordination::{AgentRegistry, AssignmentEngine, AssignmentLedger, ReconciliationMonitor, SnapshotCache, TaskLifecycle};
use marcus::error_handling::{CallRateLimiter, CircuitBreakerRegistry, RetryPolicy};
use marcus::infrastructure::config::ConfigLoader;
use marcus::infrastructure::logging::LoggerImpl;
use marcus::monitoring::ErrorMonitor;
use marcus::server::{self, AppState, RealtimeLog};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path).context("failed to load configuration from --config")?,
        None => ConfigLoader::load().context("failed to load configuration")?,
    };
    cli.apply_overrides(&mut config);

    let _logger = LoggerImpl::init(&config.logging).context("failed to initialize logging")?;

    let kanban: Arc<dyn marcus::domain::ports::KanbanProvider> = Arc::new(InMemoryKanban::new());
    let ai: Arc<dyn marcus::domain::ports::AiAdapter> = Arc::new(MockAiAdapter::new());

    let ledger = Arc::new(
        AssignmentLedger::load(config.storage.ledger_path.clone())
            .await
            .context("failed to load assignment ledger")?,
    );
    let registry = AgentRegistry::new();
    let circuit_breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker.clone()));
    let retry_policy = RetryPolicy::from(&config.retry);
    let rate_limiter = CallRateLimiter::new(&config.rate_limit);
    let error_monitor = Arc::new(ErrorMonitor::new(config.monitor.history_capacity));

    let engine = Arc::new(AssignmentEngine::new(
        ledger.clone(),
        registry.clone(),
        kanban.clone(),
        ai.clone(),
        circuit_breakers.clone(),
        retry_policy,
        rate_limiter,
    ));
    let lifecycle = Arc::new(TaskLifecycle::new(
        ledger.clone(),
        registry.clone(),
        kanban.clone(),
        ai.clone(),
        error_monitor.clone(),
    ));
    let reconciliation = Arc::new(ReconciliationMonitor::new(
        config.reconciliation.clone(),
        ledger.clone(),
        kanban.clone(),
        lifecycle.clone(),
    ));
    let snapshot = Arc::new(SnapshotCache::new(kanban.clone()));
    let realtime_log = Arc::new(RealtimeLog::new(config.storage.realtime_log_path.clone()));

    snapshot.clone().spawn_periodic_refresh(Duration::from_secs(config.reconciliation.tick_secs));
    reconciliation.clone().spawn();

    let state = AppState {
        registry,
        ledger,
        kanban,
        ai,
        engine,
        lifecycle,
        reconciliation,
        snapshot,
        error_monitor,
        monitor_config: config.monitor.clone(),
        realtime_log,
    };

    server::run(state).await.context("stdio dispatcher loop exited with an error")
}
