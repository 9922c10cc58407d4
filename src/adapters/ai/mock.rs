//! `MockAiAdapter`: deterministic stand-in for a real AI provider, grounded
//! on the teacher's `adapters/substrates/mock.rs`. Responses are produced
//! locally and still routed through `json_extract::extract` so the parsing
//! contract is exercised the same way a real provider's text would be.

use super::json_extract;
use crate::domain::models::Task;
use crate::domain::ports::ai::{AiAdapter, ExpandedProject};
use crate::error_handling::MarcusError;
use async_trait::async_trait;
use serde_json::json;

pub struct MockAiAdapter;

impl MockAiAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiAdapter for MockAiAdapter {
    async fn generate_task_instructions(&self, task: &Task, agent_context: &str) -> Result<String, MarcusError> {
        let raw = json!({
            "instructions": format!(
                "Complete '{}': {}. Context: {}",
                task.name, task.description, agent_context
            )
        })
        .to_string();
        #[derive(serde::Deserialize)]
        struct Wrapper {
            instructions: String,
        }
        let parsed: Wrapper = json_extract::extract(&raw, "ai.generate_task_instructions")?;
        Ok(parsed.instructions)
    }

    async fn analyze_blocker(&self, task: &Task, description: &str, severity: &str) -> Result<String, MarcusError> {
        let raw = json!({
            "analysis": format!(
                "Task '{}' blocked ({severity} severity): {description}. \
                 Suggested: identify the blocking dependency and escalate if unresolved after one cycle.",
                task.name
            )
        })
        .to_string();
        #[derive(serde::Deserialize)]
        struct Wrapper {
            analysis: String,
        }
        let parsed: Wrapper = json_extract::extract(&raw, "ai.analyze_blocker")?;
        Ok(parsed.analysis)
    }

    async fn expand_project(&self, name: &str, description: &str) -> Result<ExpandedProject, MarcusError> {
        let raw = json!({
            "tasks": [
                {
                    "name": "Initial setup",
                    "description": format!("Scaffold work for {name}: {description}"),
                    "labels": [],
                    "dependencies": [],
                    "estimated_hours": null,
                    "priority": "medium",
                }
            ],
            "summary": format!("Expanded '{name}' into an initial task breakdown"),
        })
        .to_string();
        json_extract::extract(&raw, "ai.expand_project")
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn analyze_blocker_returns_text_mentioning_task_name() {
        let adapter = MockAiAdapter::new();
        let task = Task::new("T1", "Ship feature");
        let analysis = adapter
            .analyze_blocker(&task, "waiting on API keys", "high")
            .await
            .unwrap();
        assert!(analysis.contains("Ship feature"));
    }

    #[tokio::test]
    async fn expand_project_returns_at_least_one_task() {
        let adapter = MockAiAdapter::new();
        let expanded = adapter.expand_project("Chat App", "build a chat app").await.unwrap();
        assert!(!expanded.tasks.is_empty());
        assert!(!expanded.summary.is_empty());
    }
}
