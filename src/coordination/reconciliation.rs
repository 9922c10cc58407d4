//! Reconciliation monitor (C9): background drift-correction loop, grounded
//! on the teacher's periodic-daemon style (`services/memory_decay_daemon.rs`,
//! `services/task_schedule_service.rs`). Period defaults to 60s (§4.9).

use crate::coordination::ledger::AssignmentLedger;
use crate::coordination::lifecycle::TaskLifecycle;
use crate::domain::models::config::ReconciliationConfig;
use crate::domain::models::TaskStatus;
use crate::domain::ports::KanbanProvider;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    InSync,
    Drifting,
    Degraded,
}

pub struct ReconciliationMonitor {
    config: ReconciliationConfig,
    ledger: Arc<AssignmentLedger>,
    kanban: Arc<dyn KanbanProvider>,
    lifecycle: Arc<TaskLifecycle>,
    stop: Arc<AtomicBool>,
}

impl ReconciliationMonitor {
    pub fn new(
        config: ReconciliationConfig,
        ledger: Arc<AssignmentLedger>,
        kanban: Arc<dyn KanbanProvider>,
        lifecycle: Arc<TaskLifecycle>,
    ) -> Self {
        Self {
            config,
            ledger,
            kanban,
            lifecycle,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn spawn(self: Arc<Self>) {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(monitor.config.tick_secs));
            loop {
                ticker.tick().await;
                if monitor.stop.load(Ordering::Relaxed) {
                    break;
                }
                let state = monitor.tick().await;
                tracing::debug!(?state, "reconciliation tick complete");
            }
        });
    }

    /// Run a single reconciliation pass, returning the resulting sync state.
    pub async fn tick(&self) -> SyncState {
        let entries = self.ledger.get_all().await;
        let mut corrections = 0usize;
        let mut drift_observed = false;

        for (agent_id, assignment) in entries {
            let task = match self.kanban.get_task(&assignment.task_id).await {
                Ok(t) => t,
                Err(_) => {
                    drift_observed = true;
                    continue;
                }
            };

            let drifted = task.status == TaskStatus::Done
                || task.status == TaskStatus::Todo
                || task.assigned_to.as_deref() != Some(agent_id.as_str());

            if drifted {
                tracing::info!(
                    agent_id,
                    task_id = %assignment.task_id,
                    "reconciliation_corrected"
                );
                self.ledger.remove(&agent_id).await.ok();
                corrections += 1;
                continue;
            }

            // Per-agent average task time isn't tracked, so the timeout
            // defaults to the configured floor (see DESIGN.md's Open
            // Question notes) rather than the spec's "2x average" target.
            let elapsed_secs = Utc::now().signed_duration_since(assignment.last_heartbeat).num_seconds();
            let heartbeat_timeout = self
                .config
                .heartbeat_timeout_floor_secs
                .min(self.config.heartbeat_timeout_ceiling_secs);
            if elapsed_secs >= heartbeat_timeout {
                tracing::info!(agent_id, task_id = %assignment.task_id, "agent silent, marking blocked");
                let mut stale_task = task;
                stale_task.status = TaskStatus::Blocked;
                self.kanban.update_task(&stale_task).await.ok();
                self.kanban
                    .add_comment(&assignment.task_id, "marked BLOCKED: agent silent")
                    .await
                    .ok();
                self.ledger.remove(&agent_id).await.ok();
                corrections += 1;
            }
        }

        if drift_observed {
            SyncState::Degraded
        } else if corrections > 0 {
            SyncState::Drifting
        } else {
            SyncState::InSync
        }
    }
}
