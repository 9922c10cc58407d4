//! Data model for recorded errors and detected patterns (§4.2).

use crate::error_handling::{ErrorCategory, ErrorSeverity, ErrorVariant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single recorded error occurrence, stored in the monitor's ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub correlation_id: Uuid,
    pub variant: ErrorVariant,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub operation: String,
    pub agent_id: Option<String>,
    pub task_id: Option<String>,
    pub integration_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Kinds of anomalous patterns the monitor can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Same variant occurring above `frequency_threshold` within the window.
    Frequency,
    /// A burst of errors (any variant) above `burst_threshold` in a short span.
    Burst,
    /// A single agent accumulating errors above `agent_error_threshold`.
    AgentSpecific,
    /// Correlated failures across integrations suggesting a cascading outage.
    Cascade,
}

/// A detected anomaly, surfaced to the health report and formatting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub kind: PatternKind,
    pub description: String,
    pub occurrence_count: usize,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub related_agent_id: Option<String>,
    pub related_variant: Option<ErrorVariant>,
}
