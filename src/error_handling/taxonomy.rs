//! Canonical error taxonomy for the Marcus error substrate (§4.1).
//!
//! Every failure surfaced by the core is a `MarcusError`: a single struct
//! carrying category/severity/retryable as data rather than as per-variant
//! match arms, so the ~20 named variants in `spec.md` §4.1 can all share one
//! shape. `ErrorVariant` is the closed set of named failure kinds; it maps
//! deterministically to `(category, default severity, default retryable)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// High-level error categories for monitoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Transient,
    Configuration,
    BusinessLogic,
    Integration,
    Security,
    System,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Configuration => "configuration",
            Self::BusinessLogic => "business_logic",
            Self::Integration => "integration",
            Self::Security => "security",
            Self::System => "system",
        }
    }
}

/// Error severity levels for prioritization and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// The closed set of named error kinds from `spec.md` §4.1's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorVariant {
    // TRANSIENT
    NetworkTimeout,
    ServiceUnavailable,
    RateLimit,
    TemporaryResource,
    // CONFIGURATION
    MissingCredentials,
    InvalidConfiguration,
    MissingDependency,
    Environment,
    // BUSINESS_LOGIC
    TaskAssignment,
    WorkflowViolation,
    Validation,
    StateConflict,
    // INTEGRATION
    KanbanIntegration,
    AiProvider,
    Authentication,
    ExternalService,
    // SECURITY
    Authorization,
    WorkspaceSecurity,
    Permission,
    // SYSTEM
    ResourceExhaustion,
    CorruptedState,
    Database,
    CriticalDependency,
}

impl ErrorVariant {
    /// `(category, default_severity, default_retryable)` per the table in §4.1.
    pub const fn defaults(&self) -> (ErrorCategory, ErrorSeverity, bool) {
        use ErrorCategory::*;
        use ErrorSeverity::*;
        match self {
            Self::NetworkTimeout
            | Self::ServiceUnavailable
            | Self::RateLimit
            | Self::TemporaryResource => (Transient, Medium, true),

            Self::MissingCredentials
            | Self::InvalidConfiguration
            | Self::MissingDependency
            | Self::Environment => (Configuration, High, false),

            Self::TaskAssignment
            | Self::WorkflowViolation
            | Self::Validation
            | Self::StateConflict => (BusinessLogic, Medium, false),

            Self::KanbanIntegration | Self::AiProvider | Self::ExternalService => {
                (Integration, Medium, true)
            }
            Self::Authentication => (Integration, Medium, false),

            Self::Authorization | Self::WorkspaceSecurity | Self::Permission => {
                (Security, Critical, false)
            }

            Self::ResourceExhaustion
            | Self::CorruptedState
            | Self::Database
            | Self::CriticalDependency => (System, Critical, false),
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        self.defaults().0
    }

    pub const fn default_severity(&self) -> ErrorSeverity {
        self.defaults().1
    }

    pub const fn default_retryable(&self) -> bool {
        self.defaults().2
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network_timeout",
            Self::ServiceUnavailable => "service_unavailable",
            Self::RateLimit => "rate_limit",
            Self::TemporaryResource => "temporary_resource",
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidConfiguration => "invalid_configuration",
            Self::MissingDependency => "missing_dependency",
            Self::Environment => "environment",
            Self::TaskAssignment => "task_assignment",
            Self::WorkflowViolation => "workflow_violation",
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::KanbanIntegration => "kanban_integration",
            Self::AiProvider => "ai_provider",
            Self::Authentication => "authentication",
            Self::ExternalService => "external_service",
            Self::Authorization => "authorization",
            Self::WorkspaceSecurity => "workspace_security",
            Self::Permission => "permission",
            Self::ResourceExhaustion => "resource_exhaustion",
            Self::CorruptedState => "corrupted_state",
            Self::Database => "database",
            Self::CriticalDependency => "critical_dependency",
        }
    }
}

/// Rich, serializable context attached to every `MarcusError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    pub operation: String,
    pub operation_id: Uuid,
    pub agent_id: Option<String>,
    pub task_id: Option<String>,
    pub integration_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Free-form structured detail (the original's `custom_context`/`user_context`
    /// folded into a single map — see SPEC_FULL §3).
    pub custom_context: Value,
    /// Free-form agent/system snapshots, carried from `original_source` but
    /// rarely populated; kept optional so most call sites can omit them.
    pub agent_state: Option<Value>,
    pub system_state: Option<Value>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            operation_id: Uuid::new_v4(),
            agent_id: None,
            task_id: None,
            integration_name: None,
            timestamp: Utc::now(),
            custom_context: Value::Object(serde_json::Map::new()),
            agent_state: None,
            system_state: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_integration(mut self, name: impl Into<String>) -> Self {
        self.integration_name = Some(name.into());
        self
    }

    pub fn with_custom(mut self, custom: Value) -> Self {
        self.custom_context = custom;
        self
    }

    /// Merge fields from an enclosing scope into this (inner) context,
    /// without overwriting fields already set here. Used when a tagged error
    /// escapes a nested `OperationScope` (§4.1).
    pub fn enrich_from(&mut self, outer: &ErrorContext) {
        if self.agent_id.is_none() {
            self.agent_id = outer.agent_id.clone();
        }
        if self.task_id.is_none() {
            self.task_id = outer.task_id.clone();
        }
        if self.integration_name.is_none() {
            self.integration_name = outer.integration_name.clone();
        }
    }
}

/// Actionable remediation suggestions for autonomous agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Remediation {
    pub immediate: Option<String>,
    pub long_term: Option<String>,
    pub fallback: Option<String>,
    pub retry_strategy: Option<String>,
    pub escalation: Option<String>,
    /// RFC3339 timestamp of when a tripped circuit breaker next allows a
    /// probe call (§4.1's circuit breaker contract).
    pub next_attempt_time: Option<String>,
}

/// The tagged error value propagated throughout the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarcusError {
    pub message: String,
    pub error_code: String,
    pub variant: ErrorVariant,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub retryable: bool,
    pub correlation_id: Uuid,
    pub context: ErrorContext,
    pub remediation: Remediation,
    /// Stringified cause chain; kept as text since the underlying cause may
    /// not be `Clone`/`Serialize` (e.g. an `anyhow::Error`).
    pub cause: Option<String>,
}

impl MarcusError {
    pub fn new(variant: ErrorVariant, message: impl Into<String>, context: ErrorContext) -> Self {
        let (category, severity, retryable) = variant.defaults();
        Self {
            message: message.into(),
            error_code: variant.as_str().to_uppercase(),
            variant,
            category,
            severity,
            retryable,
            correlation_id: Uuid::new_v4(),
            context,
            remediation: Remediation::default(),
            cause: None,
        }
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = remediation;
        self
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Wrap an arbitrary underlying failure as an `IntegrationError`
    /// (`ExternalService` variant) with the given scope — the fallback used
    /// by `OperationScope` when an escaping error isn't already tagged.
    pub fn wrap_untagged(cause: impl fmt::Display, context: ErrorContext) -> Self {
        Self::new(ErrorVariant::ExternalService, cause.to_string(), context).with_cause(cause)
    }

    pub fn is_critical(&self) -> bool {
        self.severity == ErrorSeverity::Critical
    }
}

impl fmt::Display for MarcusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.message)
    }
}

impl std::error::Error for MarcusError {}
