//! Agent registry (C6): in-memory `agent_id -> WorkerStatus` map with
//! register/overwrite semantics. Grounded on the teacher's
//! `Arc<RwLock<HashMap<..>>>` pattern (`services/circuit_breaker.rs`).

use crate::domain::models::WorkerStatus;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AgentRegistry {
    agents: Arc<RwLock<HashMap<String, WorkerStatus>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new agent, or refresh an existing one's identity fields
    /// while preserving `current_tasks`/`completed_count`/`performance_score`.
    pub async fn register(&self, agent_id: &str, name: String, role: String, skills: BTreeSet<String>) {
        let mut agents = self.agents.write().await;
        match agents.get_mut(agent_id) {
            Some(existing) => existing.refresh_identity(name, role, skills),
            None => {
                agents.insert(agent_id.to_string(), WorkerStatus::new(agent_id, name, role, skills));
            }
        }
    }

    pub async fn get(&self, agent_id: &str) -> Option<WorkerStatus> {
        self.agents.read().await.get(agent_id).cloned()
    }

    pub async fn list(&self) -> Vec<WorkerStatus> {
        self.agents.read().await.values().cloned().collect()
    }

    pub async fn add_current_task(&self, agent_id: &str, task_id: &str) {
        if let Some(agent) = self.agents.write().await.get_mut(agent_id) {
            agent.current_tasks.push(task_id.to_string());
        }
    }

    pub async fn remove_current_task(&self, agent_id: &str, task_id: &str) {
        if let Some(agent) = self.agents.write().await.get_mut(agent_id) {
            agent.current_tasks.retain(|t| t != task_id);
        }
    }

    pub async fn increment_completed(&self, agent_id: &str) {
        if let Some(agent) = self.agents.write().await.get_mut(agent_id) {
            agent.completed_count += 1;
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_reregister_preserves_task_state() {
        let registry = AgentRegistry::new();
        registry
            .register("a1", "Alice".into(), "dev".into(), BTreeSet::from(["rust".into()]))
            .await;
        registry.add_current_task("a1", "T1").await;

        registry
            .register("a1", "Alice V2".into(), "lead".into(), BTreeSet::from(["go".into()]))
            .await;

        let agent = registry.get("a1").await.unwrap();
        assert_eq!(agent.name, "Alice V2");
        assert_eq!(agent.current_tasks, vec!["T1".to_string()]);
    }

    #[tokio::test]
    async fn list_returns_all_registered_agents() {
        let registry = AgentRegistry::new();
        registry.register("a1", "Alice".into(), "dev".into(), BTreeSet::new()).await;
        registry.register("a2", "Bob".into(), "dev".into(), BTreeSet::new()).await;
        assert_eq!(registry.list().await.len(), 2);
    }
}
