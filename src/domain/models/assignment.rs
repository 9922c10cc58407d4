//! Assignment ledger record.

use crate::domain::models::task::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single ledger entry: an agent's current task ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub task_id: String,
    pub assigned_at: DateTime<Utc>,
    pub status_at_assignment: TaskStatus,
    pub last_heartbeat: DateTime<Utc>,
}

impl Assignment {
    pub fn new(task_id: impl Into<String>, status_at_assignment: TaskStatus) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            assigned_at: now,
            status_at_assignment,
            last_heartbeat: now,
        }
    }
}
