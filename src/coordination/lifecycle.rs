//! Task lifecycle operations (C8): `report_progress`, `report_blocker`,
//! `release`. State machine grounded on `TaskStatus::valid_transitions()`/
//! `can_transition_to()` (`domain/models/task.rs`), adapted to the Marcus
//! lifecycle graph (§4.8).

use crate::coordination::ledger::AssignmentLedger;
use crate::coordination::registry::AgentRegistry;
use crate::domain::models::TaskStatus;
use crate::domain::ports::{AiAdapter, KanbanProvider};
use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use crate::monitoring::ErrorMonitor;
use chrono::Utc;
use std::sync::Arc;

/// Progress status an agent can report for a task it currently owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedStatus {
    InProgress,
    Completed,
    Blocked,
}

pub struct TaskLifecycle {
    ledger: Arc<AssignmentLedger>,
    registry: AgentRegistry,
    kanban: Arc<dyn KanbanProvider>,
    ai: Arc<dyn AiAdapter>,
    error_monitor: Arc<ErrorMonitor>,
}

impl TaskLifecycle {
    pub fn new(
        ledger: Arc<AssignmentLedger>,
        registry: AgentRegistry,
        kanban: Arc<dyn KanbanProvider>,
        ai: Arc<dyn AiAdapter>,
        error_monitor: Arc<ErrorMonitor>,
    ) -> Self {
        Self {
            ledger,
            registry,
            kanban,
            ai,
            error_monitor,
        }
    }

    /// Validate that `agent_id`'s current ledger entry matches `task_id`,
    /// per §4.8's precondition on every lifecycle operation.
    async fn assert_ownership(&self, agent_id: &str, task_id: &str, operation: &str) -> Result<(), MarcusError> {
        let assignment = self.ledger.get(agent_id).await;
        match assignment {
            Some(a) if a.task_id == task_id => Ok(()),
            _ => Err(MarcusError::new(
                ErrorVariant::TaskAssignment,
                format!("agent {agent_id} does not currently own task {task_id}"),
                ErrorContext::new(operation).with_agent(agent_id).with_task(task_id),
            )),
        }
    }

    pub async fn report_progress(
        &self,
        agent_id: &str,
        task_id: &str,
        status: ReportedStatus,
        progress: u8,
        message: &str,
    ) -> Result<(), MarcusError> {
        self.assert_ownership(agent_id, task_id, "report_task_progress").await?;
        self.ledger.update_heartbeat(agent_id).await?;

        let mut task = self.kanban.get_task(task_id).await?;

        match status {
            ReportedStatus::InProgress => {
                self.kanban
                    .add_comment(task_id, &format!("progress: {progress}% — {message}"))
                    .await?;
            }
            ReportedStatus::Blocked => {
                task.status = TaskStatus::Blocked;
                self.kanban.update_task(&task).await?;
                self.kanban.add_comment(task_id, message).await?;
            }
            ReportedStatus::Completed => {
                task.status = TaskStatus::Done;
                task.updated_at = Utc::now();
                self.kanban.update_task(&task).await?;
                self.kanban
                    .add_comment(task_id, &format!("completed — {message}"))
                    .await?;
                self.registry.increment_completed(agent_id).await;
                self.registry.remove_current_task(agent_id, task_id).await;
                self.ledger.remove(agent_id).await?;
            }
        }
        Ok(())
    }

    /// Report a blocker: set the task BLOCKED and ask the AI adapter for
    /// remediation suggestions (best-effort; failure is swallowed per §4.8).
    pub async fn report_blocker(
        &self,
        agent_id: &str,
        task_id: &str,
        description: &str,
        severity: &str,
    ) -> Result<Option<String>, MarcusError> {
        self.assert_ownership(agent_id, task_id, "report_blocker").await?;

        let mut task = self.kanban.get_task(task_id).await?;
        task.status = TaskStatus::Blocked;
        self.kanban.update_task(&task).await?;

        let advice = match self.ai.analyze_blocker(&task, description, severity).await {
            Ok(text) => Some(text),
            Err(err) => {
                self.error_monitor.record(&err).await;
                None
            }
        };

        let mut comment = format!("blocked ({severity}): {description}");
        if let Some(advice_text) = &advice {
            comment.push_str(&format!("\nsuggestions: {advice_text}"));
        }
        self.kanban.add_comment(task_id, &comment).await?;

        Ok(advice)
    }

    /// Release a task back to TODO, used by the reconciliation monitor and
    /// by an agent voluntarily giving up a task.
    pub async fn release(&self, agent_id: &str, task_id: &str) -> Result<(), MarcusError> {
        let mut task = self.kanban.get_task(task_id).await?;
        task.status = TaskStatus::Todo;
        task.assigned_to = None;
        self.kanban.update_task(&task).await?;
        self.registry.remove_current_task(agent_id, task_id).await;
        self.ledger.remove(agent_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiAdapter;
    use crate::adapters::kanban::InMemoryKanban;
    use crate::domain::models::{Task, TaskStatus};
    use tempfile::tempdir;

    async fn build() -> (TaskLifecycle, Arc<InMemoryKanban>, Arc<AssignmentLedger>, AgentRegistry, tempfile::TempDir)
    {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap());
        let registry = AgentRegistry::new();
        let kanban = Arc::new(InMemoryKanban::new());
        let ai = Arc::new(MockAiAdapter::new());
        let error_monitor = Arc::new(crate::monitoring::ErrorMonitor::new(100));
        let lifecycle = TaskLifecycle::new(ledger.clone(), registry.clone(), kanban.clone(), ai, error_monitor);
        (lifecycle, kanban, ledger, registry, dir)
    }

    #[tokio::test]
    async fn report_progress_rejects_mismatched_ownership() {
        let (lifecycle, kanban, ledger, _registry, _dir) = build().await;
        kanban.seed(Task::new("T1", "task")).await;
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();

        let result = lifecycle
            .report_progress("a2", "T1", ReportedStatus::InProgress, 50, "working")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn completed_report_clears_ledger_and_increments_counter() {
        let (lifecycle, kanban, ledger, registry, _dir) = build().await;
        kanban.seed(Task::new("T1", "task")).await;
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();
        registry.register("a1", "Alice".into(), "dev".into(), Default::default()).await;

        lifecycle
            .report_progress("a1", "T1", ReportedStatus::Completed, 100, "done")
            .await
            .unwrap();

        assert!(ledger.get("a1").await.is_none());
        let agent = registry.get("a1").await.unwrap();
        assert_eq!(agent.completed_count, 1);

        let task = kanban.get_task("T1").await.unwrap();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn report_blocker_sets_status_and_returns_advice() {
        let (lifecycle, kanban, ledger, _registry, _dir) = build().await;
        kanban.seed(Task::new("T1", "task")).await;
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();

        let advice = lifecycle.report_blocker("a1", "T1", "waiting on creds", "high").await.unwrap();
        assert!(advice.is_some());
        let task = kanban.get_task("T1").await.unwrap();
        assert_eq!(task.status, TaskStatus::Blocked);
    }

    #[tokio::test]
    async fn release_returns_task_to_todo_and_clears_ledger() {
        let (lifecycle, kanban, ledger, _registry, _dir) = build().await;
        kanban.seed(Task::new("T1", "task")).await;
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();

        lifecycle.release("a1", "T1").await.unwrap();
        assert!(ledger.get("a1").await.is_none());
        assert_eq!(kanban.get_task("T1").await.unwrap().status, TaskStatus::Todo);
    }

    struct FailingAi;

    #[async_trait::async_trait]
    impl crate::domain::ports::AiAdapter for FailingAi {
        async fn generate_task_instructions(&self, _task: &Task, _agent_context: &str) -> Result<String, MarcusError> {
            unreachable!("not exercised by this test")
        }

        async fn analyze_blocker(&self, _task: &Task, _description: &str, _severity: &str) -> Result<String, MarcusError> {
            Err(MarcusError::new(
                ErrorVariant::AiProvider,
                "provider unavailable",
                ErrorContext::new("ai.analyze_blocker").with_integration("ai"),
            ))
        }

        async fn expand_project(
            &self,
            _name: &str,
            _description: &str,
        ) -> Result<crate::domain::ports::ExpandedProject, MarcusError> {
            unreachable!("not exercised by this test")
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn report_blocker_swallows_ai_failure_and_records_it() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap());
        let registry = AgentRegistry::new();
        let kanban = Arc::new(InMemoryKanban::new());
        let error_monitor = Arc::new(crate::monitoring::ErrorMonitor::new(100));
        let lifecycle = TaskLifecycle::new(ledger.clone(), registry, kanban.clone(), Arc::new(FailingAi), error_monitor.clone());

        kanban.seed(Task::new("T1", "task")).await;
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();

        let advice = lifecycle.report_blocker("a1", "T1", "waiting on creds", "high").await.unwrap();
        assert!(advice.is_none());
        assert_eq!(kanban.get_task("T1").await.unwrap().status, TaskStatus::Blocked);

        let recorded = error_monitor.snapshot().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].integration_name.as_deref(), Some("ai"));
    }
}
