//! Project-state snapshot (C11): cached aggregate over all tasks, grounded
//! on the teacher's cached-aggregate style (`services/cost_tracker.rs`,
//! `services/budget_tracker.rs`). Recomputed on demand and on a slow tick
//! (default 5 min).

use crate::domain::models::{Task, TaskStatus};
use crate::domain::ports::KanbanProvider;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStateSnapshot {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub progress_percent: f64,
    pub team_velocity: f64,
    pub risk_level: RiskLevel,
    pub computed_at: chrono::DateTime<Utc>,
}

fn compute(tasks: &[Task]) -> ProjectStateSnapshot {
    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    let in_progress = tasks.iter().filter(|t| t.status == TaskStatus::InProgress).count();
    let blocked = tasks.iter().filter(|t| t.status == TaskStatus::Blocked).count();

    let progress_percent = if total == 0 { 0.0 } else { (done as f64 / total as f64) * 100.0 };

    let week_ago = Utc::now() - Duration::days(7);
    let completed_last_week = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done && t.updated_at >= week_ago)
        .count();
    let team_velocity = completed_last_week as f64 / 7.0;

    let has_overdue = tasks
        .iter()
        .any(|t| t.status != TaskStatus::Done && t.due_date.is_some_and(|d| d < Utc::now()));

    let risk_level = if blocked > 5 || has_overdue {
        RiskLevel::High
    } else if blocked > 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    ProjectStateSnapshot {
        total,
        done,
        in_progress,
        blocked,
        progress_percent,
        team_velocity,
        risk_level,
        computed_at: Utc::now(),
    }
}

/// Caches the last computed snapshot; recomputes on `refresh()` and exposes
/// a read-only `current()` for callers between ticks.
pub struct SnapshotCache {
    kanban: Arc<dyn KanbanProvider>,
    cached: RwLock<Option<ProjectStateSnapshot>>,
}

impl SnapshotCache {
    pub fn new(kanban: Arc<dyn KanbanProvider>) -> Self {
        Self {
            kanban,
            cached: RwLock::new(None),
        }
    }

    pub async fn refresh(&self) -> Result<ProjectStateSnapshot, crate::error_handling::MarcusError> {
        let tasks = self.kanban.get_all_tasks().await?;
        let snapshot = compute(&tasks);
        *self.cached.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn current(&self) -> Option<ProjectStateSnapshot> {
        self.cached.read().await.clone()
    }

    pub fn spawn_periodic_refresh(self: Arc<Self>, period: std::time::Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(err) = self.refresh().await {
                    tracing::warn!(error = %err, "failed to refresh project-state snapshot");
                }
            }
        });
    }
}
