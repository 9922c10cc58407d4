//! Task domain model mirrored from the external kanban board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status of a task as tracked by Marcus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Blocked => "BLOCKED",
            Self::Done => "DONE",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" | "INPROGRESS" => Some(Self::InProgress),
            "BLOCKED" => Some(Self::Blocked),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// Terminal states never transition further from Marcus's side.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Valid transitions from this status, per the lifecycle graph in §4.8.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Todo => &[Self::InProgress],
            Self::InProgress => &[Self::InProgress, Self::Blocked, Self::Done],
            Self::Blocked => &[Self::InProgress, Self::Todo],
            Self::Done => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }

    /// Whether a task in this status may carry an `assigned_to`.
    ///
    /// `assigned_to != null <=> status in {IN_PROGRESS, BLOCKED}` per §3.
    pub fn allows_assignment(&self) -> bool {
        matches!(self, Self::InProgress | Self::Blocked)
    }
}

/// Priority as assigned by the kanban board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl TaskPriority {
    /// Weight used by the assignment engine's scoring function (§4.7 step 4).
    pub fn weight(&self) -> f64 {
        match self {
            Self::Urgent => 1.0,
            Self::High => 0.75,
            Self::Medium => 0.5,
            Self::Low => 0.25,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

/// A unit of work mirrored from the kanban board.
///
/// `id` is opaque and board-scoped: Marcus never mints task ids, it only
/// reflects what `KanbanProvider` reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Construct a minimal task, used by tests and the in-memory kanban adapter.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assigned_to: None,
            labels: BTreeSet::new(),
            dependencies: Vec::new(),
            estimated_hours: None,
            actual_hours: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `status == DONE => actual_hours >= 0` per §3's invariant.
    pub fn satisfies_completion_invariant(&self) -> bool {
        if self.status != TaskStatus::Done {
            return true;
        }
        self.actual_hours.is_none_or(|h| h >= 0.0)
    }
}
