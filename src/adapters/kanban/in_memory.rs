//! `InMemoryKanban`: a reference/test adapter implementing `KanbanProvider`
//! against an in-process map, grounded on the teacher's
//! `adapters/substrates/mock.rs` in-memory stand-in pattern. No concrete
//! external board backend (Planka, Trello, ...) is in scope for the core.

use crate::domain::models::{Task, TaskStatus};
use crate::domain::ports::KanbanProvider;
use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemoryKanban {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
    comments: Arc<RwLock<HashMap<String, Vec<String>>>>,
    next_id: Arc<RwLock<u64>>,
}

impl InMemoryKanban {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            comments: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Seed the board with a task, bypassing `create_task`'s id minting —
    /// used by tests that need deterministic ids.
    pub async fn seed(&self, task: Task) {
        self.tasks.write().await.insert(task.id.clone(), task);
    }

    pub async fn comments_for(&self, task_id: &str) -> Vec<String> {
        self.comments
            .read()
            .await
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryKanban {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KanbanProvider for InMemoryKanban {
    async fn get_available_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        // BLOCKED tasks are treated as available alongside TODO since this
        // adapter has no separate blocker-cleared signal; the engine still
        // excludes anything with a live ledger entry before scoring.
        let tasks = self.tasks.read().await;
        Ok(tasks
            .values()
            .filter(|t| matches!(t.status, TaskStatus::Todo | TaskStatus::Blocked))
            .cloned()
            .collect())
    }

    async fn get_all_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, MarcusError> {
        self.tasks.read().await.get(task_id).cloned().ok_or_else(|| {
            MarcusError::new(
                ErrorVariant::Validation,
                format!("no such task: {task_id}"),
                ErrorContext::new("kanban.get_task").with_task(task_id),
            )
        })
    }

    async fn update_task(&self, task: &Task) -> Result<(), MarcusError> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(MarcusError::new(
                ErrorVariant::Validation,
                format!("no such task: {}", task.id),
                ErrorContext::new("kanban.update_task").with_task(&task.id),
            ));
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn add_comment(&self, task_id: &str, comment: &str) -> Result<(), MarcusError> {
        if !self.tasks.read().await.contains_key(task_id) {
            return Err(MarcusError::new(
                ErrorVariant::Validation,
                format!("no such task: {task_id}"),
                ErrorContext::new("kanban.add_comment").with_task(task_id),
            ));
        }
        self.comments
            .write()
            .await
            .entry(task_id.to_string())
            .or_default()
            .push(comment.to_string());
        Ok(())
    }

    async fn create_task(&self, mut task: Task) -> Result<Task, MarcusError> {
        let mut next_id = self.next_id.write().await;
        task.id = format!("T{}", *next_id);
        *next_id += 1;
        self.tasks.write().await.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
