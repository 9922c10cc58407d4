//! Assignment ledger (C5): durable `agent_id -> Assignment` map with
//! atomic-replace persistence, grounded on the crash-safety requirement in
//! §4.5 and the teacher's preference for `tokio::fs` plus explicit error
//! types over bare `std::fs` calls.

use crate::domain::models::{Assignment, TaskStatus};
use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    entries: HashMap<String, Assignment>,
}

/// Crash-safe, in-memory-cached ledger of current agent -> task assignments.
pub struct AssignmentLedger {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, Assignment>>>,
}

impl AssignmentLedger {
    /// Load the ledger from `path`, starting empty if the file does not exist.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, MarcusError> {
        let path = path.into();
        let entries = if path.exists() {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                MarcusError::new(
                    ErrorVariant::CorruptedState,
                    format!("failed to read ledger file: {e}"),
                    ErrorContext::new("ledger.load"),
                )
            })?;
            let file: LedgerFile = serde_json::from_slice(&bytes).map_err(|e| {
                MarcusError::new(
                    ErrorVariant::CorruptedState,
                    format!("failed to parse ledger file: {e}"),
                    ErrorContext::new("ledger.load"),
                )
            })?;
            file.entries
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    async fn persist(&self, entries: &HashMap<String, Assignment>) -> Result<(), MarcusError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let file = LedgerFile {
            entries: entries.clone(),
        };
        let payload = serde_json::to_vec_pretty(&file).map_err(|e| {
            MarcusError::new(
                ErrorVariant::CorruptedState,
                format!("failed to serialize ledger: {e}"),
                ErrorContext::new("ledger.persist"),
            )
        })?;

        let tmp_path = self.path.with_extension("tmp");
        let mut tmp_file = tokio::fs::File::create(&tmp_path).await.map_err(|e| {
            MarcusError::new(
                ErrorVariant::CorruptedState,
                format!("failed to create ledger temp file: {e}"),
                ErrorContext::new("ledger.persist"),
            )
        })?;
        tmp_file.write_all(&payload).await.map_err(|e| {
            MarcusError::new(
                ErrorVariant::CorruptedState,
                format!("failed to write ledger temp file: {e}"),
                ErrorContext::new("ledger.persist"),
            )
        })?;
        tmp_file.sync_all().await.ok();
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            MarcusError::new(
                ErrorVariant::CorruptedState,
                format!("failed to replace ledger file: {e}"),
                ErrorContext::new("ledger.persist"),
            )
        })?;
        Ok(())
    }

    /// Add an assignment, rejecting if `agent_id` already holds one, or if
    /// `task_id` is already assigned to a different agent (uniqueness
    /// invariant, enforced on every write).
    pub async fn add(
        &self,
        agent_id: &str,
        task_id: &str,
        status_at_assignment: TaskStatus,
    ) -> Result<(), MarcusError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(agent_id) {
            return Err(MarcusError::new(
                ErrorVariant::StateConflict,
                format!("agent {agent_id} already holds an assignment"),
                ErrorContext::new("ledger.add").with_agent(agent_id).with_task(task_id),
            ));
        }
        if entries.values().any(|a| a.task_id == task_id) {
            return Err(MarcusError::new(
                ErrorVariant::StateConflict,
                format!("task {task_id} is already assigned to another agent"),
                ErrorContext::new("ledger.add").with_agent(agent_id).with_task(task_id),
            ));
        }
        entries.insert(agent_id.to_string(), Assignment::new(task_id, status_at_assignment));
        self.persist(&entries).await
    }

    pub async fn get(&self, agent_id: &str) -> Option<Assignment> {
        self.entries.read().await.get(agent_id).cloned()
    }

    pub async fn get_all(&self) -> HashMap<String, Assignment> {
        self.entries.read().await.clone()
    }

    pub async fn get_all_assigned_task_ids(&self) -> HashSet<String> {
        self.entries.read().await.values().map(|a| a.task_id.clone()).collect()
    }

    pub async fn remove(&self, agent_id: &str) -> Result<Option<Assignment>, MarcusError> {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(agent_id);
        if removed.is_some() {
            self.persist(&entries).await?;
        }
        Ok(removed)
    }

    pub async fn update_heartbeat(&self, agent_id: &str) -> Result<(), MarcusError> {
        self.set_heartbeat(agent_id, chrono::Utc::now()).await
    }

    /// Set an explicit heartbeat timestamp. Exposed beyond `update_heartbeat`
    /// so tests can simulate a stale agent without sleeping.
    pub async fn set_heartbeat(&self, agent_id: &str, ts: chrono::DateTime<chrono::Utc>) -> Result<(), MarcusError> {
        let mut entries = self.entries.write().await;
        if let Some(assignment) = entries.get_mut(agent_id) {
            assignment.last_heartbeat = ts;
            self.persist(&entries).await?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn add_rejects_second_assignment_for_same_agent() {
        let dir = tempdir().unwrap();
        let ledger = AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap();
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();
        let result = ledger.add("a1", "T2", TaskStatus::InProgress).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn add_rejects_duplicate_task_ownership() {
        let dir = tempdir().unwrap();
        let ledger = AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap();
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();
        let result = ledger.add("a2", "T1", TaskStatus::InProgress).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn persists_and_reloads_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let ledger = AssignmentLedger::load(&path).await.unwrap();
            ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();
        }
        let reloaded = AssignmentLedger::load(&path).await.unwrap();
        assert_eq!(reloaded.get("a1").await.unwrap().task_id, "T1");
    }

    #[tokio::test]
    async fn remove_clears_entry() {
        let dir = tempdir().unwrap();
        let ledger = AssignmentLedger::load(dir.path().join("ledger.json")).await.unwrap();
        ledger.add("a1", "T1", TaskStatus::InProgress).await.unwrap();
        ledger.remove("a1").await.unwrap();
        assert!(ledger.get("a1").await.is_none());
    }
}
