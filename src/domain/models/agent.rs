//! Agent (WorkerStatus) domain model — the live roster entry for a worker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Live roster entry for a registered worker agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub agent_id: String,
    pub name: String,
    pub role: String,
    pub skills: BTreeSet<String>,
    pub capacity: usize,
    pub current_tasks: Vec<String>,
    pub completed_count: u64,
    pub performance_score: f64,
}

impl WorkerStatus {
    pub fn new(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        skills: BTreeSet<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            role: role.into(),
            skills,
            capacity: 1,
            current_tasks: Vec::new(),
            completed_count: 0,
            performance_score: 1.0,
        }
    }

    /// `|current_tasks| <= capacity` per §3's invariant.
    pub fn at_capacity(&self) -> bool {
        self.current_tasks.len() >= self.capacity
    }

    /// Refresh identity fields from a re-registration, preserving live state
    /// (`current_tasks`, `completed_count`, `performance_score`) per §4.6.
    pub fn refresh_identity(&mut self, name: String, role: String, skills: BTreeSet<String>) {
        self.name = name;
        self.role = role;
        self.skills = skills;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_registration_preserves_live_state() {
        let mut worker = WorkerStatus::new("a1", "Alice", "dev", BTreeSet::from(["python".into()]));
        worker.current_tasks.push("T1".into());
        worker.completed_count = 3;

        worker.refresh_identity(
            "Alice V2".into(),
            "lead".into(),
            BTreeSet::from(["rust".into()]),
        );

        assert_eq!(worker.name, "Alice V2");
        assert_eq!(worker.role, "lead");
        assert_eq!(worker.skills, BTreeSet::from(["rust".into()]));
        assert_eq!(worker.current_tasks, vec!["T1".to_string()]);
        assert_eq!(worker.completed_count, 3);
    }

    #[test]
    fn at_capacity_respects_capacity_field() {
        let mut worker = WorkerStatus::new("a1", "Alice", "dev", BTreeSet::new());
        assert!(!worker.at_capacity());
        worker.current_tasks.push("T1".into());
        assert!(worker.at_capacity());
    }
}
