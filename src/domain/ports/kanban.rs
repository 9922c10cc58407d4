//! `KanbanProvider`: the narrow external contract for the board backend
//! Marcus coordinates against (§4.4). Grounded on the teacher's
//! `domain/ports/task_queue_service.rs` trait shape; concrete backends
//! (Planka, Trello, GitHub Projects, ...) are out of scope for the core —
//! only a mock/in-memory adapter ships (`adapters::kanban::InMemoryKanban`).

use crate::domain::models::Task;
use crate::error_handling::MarcusError;
use async_trait::async_trait;

/// The set of operations Marcus needs from a kanban-style board.
#[async_trait]
pub trait KanbanProvider: Send + Sync {
    /// List tasks in a state available for assignment (`TODO`, and
    /// `BLOCKED` tasks whose blocker has cleared).
    async fn get_available_tasks(&self) -> Result<Vec<Task>, MarcusError>;

    /// List every task on the board regardless of status, used to compute
    /// the project-state aggregate (§4.11).
    async fn get_all_tasks(&self) -> Result<Vec<Task>, MarcusError>;

    /// Fetch a single task by its board-scoped opaque id.
    async fn get_task(&self, task_id: &str) -> Result<Task, MarcusError>;

    /// Apply a status/assignee update to a task on the board.
    async fn update_task(&self, task: &Task) -> Result<(), MarcusError>;

    /// Post a comment (progress note, blocker detail, AI-provided guidance)
    /// to a task's activity feed.
    async fn add_comment(&self, task_id: &str, comment: &str) -> Result<(), MarcusError>;

    /// Create a new task on the board (used by `create_project`/`add_feature`).
    async fn create_task(&self, task: Task) -> Result<Task, MarcusError>;

    /// Stable identifier for this provider instance, used to scope circuit
    /// breakers and rate limiters (e.g. `"planka"`, `"in_memory"`).
    fn provider_name(&self) -> &str;
}
