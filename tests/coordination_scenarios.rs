//! End-to-end scenarios driving the tool handlers against a full `AppState`,
//! covering the uniqueness/at-most-one/persistence/reconciliation invariants
//! and the concrete scenarios named in the specification's testable
//! properties.

use marcus::adapters::ai::MockAiAdapter;
use marcus::adapters::kanban::InMemoryKanban;
use marcus::coordination::{AgentRegistry, AssignmentEngine, AssignmentLedger, ReconciliationMonitor, SnapshotCache, TaskLifecycle};
use marcus::domain::models::config::{CircuitBreakerConfig, RateLimitConfig, ReconciliationConfig, RetryConfig};
use marcus::domain::models::{Task, TaskStatus};
use marcus::domain::ports::{AiAdapter, KanbanProvider};
use marcus::error_handling::{CallRateLimiter, CircuitBreakerRegistry, ErrorContext, ErrorVariant, MarcusError, RetryPolicy};
use marcus::monitoring::ErrorMonitor;
use marcus::server::{tools, AppState, RealtimeLog};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

async fn build_state() -> (AppState, Arc<InMemoryKanban>, TempDir) {
    let dir = TempDir::new().unwrap();
    let registry = AgentRegistry::new();
    let ledger = Arc::new(AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap());
    let in_memory_kanban = Arc::new(InMemoryKanban::new());
    let kanban: Arc<dyn KanbanProvider> = in_memory_kanban.clone();
    let ai: Arc<dyn AiAdapter> = Arc::new(MockAiAdapter::new());
    let breakers = Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::default()));
    let retry = RetryPolicy::from(&RetryConfig::default());
    let rate_limiter = CallRateLimiter::new(&RateLimitConfig::default());
    let error_monitor = Arc::new(ErrorMonitor::new(1000));

    let engine = Arc::new(AssignmentEngine::new(
        ledger.clone(),
        registry.clone(),
        kanban.clone(),
        ai.clone(),
        breakers,
        retry,
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
        ReconciliationConfig::default(),
        ledger.clone(),
        kanban.clone(),
        lifecycle.clone(),
    ));
    let snapshot = Arc::new(SnapshotCache::new(kanban.clone()));
    let realtime_log = Arc::new(RealtimeLog::new(dir.path().join("realtime.jsonl")));

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
        monitor_config: Default::default(),
        realtime_log,
    };
    (state, in_memory_kanban, dir)
}

/// S1: two agents with disjoint skills each get the task matching their
/// skill set, regardless of call order.
#[tokio::test]
async fn s1_skill_based_pick() {
    let (state, kanban, _dir) = build_state().await;

    let mut t1 = Task::new("T1", "python api work");
    t1.labels = BTreeSet::from(["python".to_string(), "api".to_string()]);
    let mut t2 = Task::new("T2", "react frontend work");
    t2.labels = BTreeSet::from(["react".to_string(), "frontend".to_string()]);
    kanban.seed(t1).await;
    kanban.seed(t2).await;

    tools::register_agent(
        &state,
        &json!({"agent_id": "A1", "name": "Alice", "role": "dev", "skills": ["python", "api"]}),
    )
    .await
    .unwrap();
    tools::register_agent(
        &state,
        &json!({"agent_id": "A2", "name": "Bob", "role": "dev", "skills": ["react", "css"]}),
    )
    .await
    .unwrap();

    let a1_result = tools::request_next_task(&state, &json!({"agent_id": "A1"})).await.unwrap();
    let a2_result = tools::request_next_task(&state, &json!({"agent_id": "A2"})).await.unwrap();

    assert_eq!(a1_result["task"]["id"], json!("T1"));
    assert_eq!(a2_result["task"]["id"], json!("T2"));
}

/// S2 / invariants 1-2: under N concurrent requests with K < N available
/// tasks, exactly K distinct assignments are made and the rest see "no task
/// available" — no task is ever handed to two agents.
#[tokio::test]
async fn s2_no_duplicate_assignments_under_concurrency() {
    let (state, kanban, _dir) = build_state().await;
    let state = Arc::new(state);

    for i in 0..5 {
        kanban.seed(Task::new(format!("T{i}"), format!("task {i}"))).await;
    }
    for i in 0..8 {
        tools::register_agent(
            &state,
            &json!({"agent_id": format!("A{i}"), "name": format!("Agent {i}"), "role": "dev", "skills": []}),
        )
        .await
        .unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..8 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            tools::request_next_task(&state, &json!({"agent_id": format!("A{i}")})).await.unwrap()
        }));
    }

    let mut assigned_task_ids = BTreeSet::new();
    let mut none_available = 0;
    for handle in handles {
        let result = handle.await.unwrap();
        match result["task"].as_object() {
            Some(task) => {
                assigned_task_ids.insert(task["id"].as_str().unwrap().to_string());
            }
            None => none_available += 1,
        }
    }

    assert_eq!(assigned_task_ids.len(), 5);
    assert_eq!(none_available, 3);
}

/// S3: progress transitions through in_progress then completed leave the
/// board DONE, clear the ledger, and bump the agent's completed counter.
#[tokio::test]
async fn s3_progress_transitions_to_completion() {
    let (state, kanban, _dir) = build_state().await;
    kanban.seed(Task::new("T1", "ship it")).await;
    tools::register_agent(&state, &json!({"agent_id": "A1", "name": "Alice", "role": "dev", "skills": []}))
        .await
        .unwrap();
    tools::request_next_task(&state, &json!({"agent_id": "A1"})).await.unwrap();

    tools::report_task_progress(
        &state,
        &json!({"agent_id": "A1", "task_id": "T1", "status": "in_progress", "progress": 50, "message": "halfway"}),
    )
    .await
    .unwrap();
    tools::report_task_progress(
        &state,
        &json!({"agent_id": "A1", "task_id": "T1", "status": "completed", "progress": 100, "message": "done"}),
    )
    .await
    .unwrap();

    let task = kanban.get_task("T1").await.unwrap();
    assert_eq!(task.status, TaskStatus::Done);
    assert!(state.ledger.get("A1").await.is_none());
    let agent = state.registry.get("A1").await.unwrap();
    assert_eq!(agent.completed_count, 1);
}

/// S6: ping echoes its input and reports the server as online.
#[tokio::test]
async fn s6_ping_echoes_input() {
    let (state, _kanban, _dir) = build_state().await;
    let result = tools::ping(&state, &json!({"echo": "hi"})).await.unwrap();
    assert_eq!(result["status"], json!("online"));
    assert_eq!(result["echo"], json!("hi"));
    assert!(result["timestamp"].is_string());
}

/// Invariant 3: restarting against the same ledger file reproduces identical
/// ledger contents.
#[tokio::test]
async fn invariant_ledger_persists_across_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");

    {
        let ledger = AssignmentLedger::load(&path).await.unwrap();
        ledger.add("A1", "T1", TaskStatus::Todo).await.unwrap();
    }

    let reloaded = AssignmentLedger::load(&path).await.unwrap();
    let assignment = reloaded.get("A1").await.unwrap();
    assert_eq!(assignment.task_id, "T1");
}

/// Invariant 9: a ledger entry whose task has externally moved to DONE is
/// dropped by the next reconciliation tick.
#[tokio::test]
async fn invariant_reconciliation_drops_externally_completed_task() {
    let (state, kanban, _dir) = build_state().await;
    kanban.seed(Task::new("T1", "external completion")).await;
    tools::register_agent(&state, &json!({"agent_id": "A1", "name": "Alice", "role": "dev", "skills": []}))
        .await
        .unwrap();
    tools::request_next_task(&state, &json!({"agent_id": "A1"})).await.unwrap();
    assert!(state.ledger.get("A1").await.is_some());

    let mut task = kanban.get_task("T1").await.unwrap();
    task.status = TaskStatus::Done;
    kanban.update_task(&task).await.unwrap();

    state.reconciliation.tick().await;
    assert!(state.ledger.get("A1").await.is_none());
}

/// Wraps an `InMemoryKanban`, failing `get_available_tasks` with a retryable
/// `NetworkTimeout` the first `fail_count` calls before delegating through.
struct FlakyKanban {
    inner: Arc<InMemoryKanban>,
    calls: AtomicUsize,
    fail_count: usize,
}

#[async_trait::async_trait]
impl KanbanProvider for FlakyKanban {
    async fn get_available_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_count {
            return Err(MarcusError::new(
                ErrorVariant::NetworkTimeout,
                "kanban temporarily unreachable",
                ErrorContext::new("kanban.get_available_tasks"),
            ));
        }
        self.inner.get_available_tasks().await
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        self.inner.get_all_tasks().await
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, MarcusError> {
        self.inner.get_task(task_id).await
    }

    async fn update_task(&self, task: &Task) -> Result<(), MarcusError> {
        self.inner.update_task(task).await
    }

    async fn add_comment(&self, task_id: &str, comment: &str) -> Result<(), MarcusError> {
        self.inner.add_comment(task_id, comment).await
    }

    async fn create_task(&self, task: Task) -> Result<Task, MarcusError> {
        self.inner.create_task(task).await
    }

    fn provider_name(&self) -> &str {
        "flaky"
    }
}

/// S5: a kanban provider that fails twice with a transient error before
/// succeeding still yields a task, having been called three times total.
#[tokio::test]
async fn s5_transient_kanban_failure_recovers_via_retry() {
    let dir = TempDir::new().unwrap();
    let registry = AgentRegistry::new();
    let ledger = Arc::new(AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap());
    let inner = Arc::new(InMemoryKanban::new());
    inner.seed(Task::new("T1", "recoverable task")).await;
    let flaky = Arc::new(FlakyKanban {
        inner: inner.clone(),
        calls: AtomicUsize::new(0),
        fail_count: 2,
    });
    let kanban: Arc<dyn KanbanProvider> = flaky.clone();
    let ai: Arc<dyn AiAdapter> = Arc::new(MockAiAdapter::new());
    let breakers = Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::default()));
    let retry = RetryPolicy::from(&RetryConfig {
        max_attempts: 5,
        base_delay_ms: 1,
        max_delay_ms: 1,
        multiplier: 1.0,
    });
    let rate_limiter = CallRateLimiter::new(&RateLimitConfig::default());
    let engine = AssignmentEngine::new(ledger.clone(), registry.clone(), kanban, ai, breakers, retry, rate_limiter);

    registry.register("A1", "Alice".into(), "dev".into(), BTreeSet::new()).await;
    let outcome = engine.request_next_task("A1").await.unwrap();
    assert!(matches!(outcome, marcus::coordination::AssignmentOutcome::Assigned { .. }));
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
}
