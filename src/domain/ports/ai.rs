//! `AiAdapter`: the narrow interface to an AI provider used for generating
//! task instructions, blocker analysis, and PRD expansion (§4.12).
//! Grounded on the teacher's AI-facing port traits, generalized to Marcus's
//! three call sites.

use crate::domain::models::Task;
use crate::error_handling::MarcusError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One feature/task expanded from a PRD-style description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandedTask {
    pub name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub dependencies: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub priority: String,
}

/// Result of expanding a project/feature description into concrete tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandedProject {
    pub tasks: Vec<ExpandedTask>,
    pub summary: String,
}

#[async_trait]
pub trait AiAdapter: Send + Sync {
    /// Generate agent-facing instructions for a newly assigned task.
    /// Best-effort from the caller's perspective: failures are swallowed by
    /// `coordination::engine` and surfaced as an absent field, not an error.
    async fn generate_task_instructions(&self, task: &Task, agent_context: &str) -> Result<String, MarcusError>;

    /// Analyze a reported blocker and produce remediation guidance text.
    /// Also best-effort; failures are swallowed by `coordination::lifecycle`.
    async fn analyze_blocker(&self, task: &Task, description: &str, severity: &str) -> Result<String, MarcusError>;

    /// Expand a free-text project/feature description into concrete tasks.
    /// Unlike the two calls above, failure here is fatal and surfaces as an
    /// `IntegrationError` to the caller.
    async fn expand_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<ExpandedProject, MarcusError>;

    /// Stable identifier for this provider instance (e.g. `"claude"`, `"mock"`).
    fn provider_name(&self) -> &str;
}
