//! The response formatter (C3): renders a single `MarcusError` (or a batch
//! of them) into six distinct output shapes per §4.3, sanitizing sensitive
//! fields along the way.

pub mod sanitize;

use crate::error_handling::{ErrorAggregator, MarcusError};
use serde_json::{json, Value};

/// MCP tool-call error shape: `{ "error": { code, message, ... } }`.
pub fn format_mcp(error: &MarcusError) -> Value {
    sanitize::sanitize(&json!({
        "error": {
            "code": error.error_code,
            "message": error.message,
            "category": error.category.as_str(),
            "severity": error.severity.as_str(),
            "retryable": error.retryable,
            "correlation_id": error.correlation_id,
        }
    }))
}

/// HTTP-style JSON error body, including a conventional `status` field
/// derived from severity.
pub fn format_http_json(error: &MarcusError) -> Value {
    let status = match error.severity {
        crate::error_handling::ErrorSeverity::Low | crate::error_handling::ErrorSeverity::Medium => 400,
        crate::error_handling::ErrorSeverity::High => 422,
        crate::error_handling::ErrorSeverity::Critical => 500,
    };
    sanitize::sanitize(&json!({
        "status": status,
        "error_code": error.error_code,
        "message": error.message,
        "correlation_id": error.correlation_id,
    }))
}

/// Short, human-readable one-liner suitable for a CLI or chat surface.
pub fn format_user(error: &MarcusError) -> String {
    let mut parts = vec![error.message.clone()];
    if let Some(immediate) = &error.remediation.immediate {
        parts.push(format!("Try: {immediate}"));
    }
    parts.join(" ")
}

/// Structured single-line log record (paired with `tracing` fields by the
/// caller; this returns the JSON Value for embedding in a log event).
pub fn format_log(error: &MarcusError) -> Value {
    sanitize::sanitize(&json!({
        "event": "marcus_error",
        "error_code": error.error_code,
        "category": error.category.as_str(),
        "severity": error.severity.as_str(),
        "operation": error.context.operation,
        "agent_id": error.context.agent_id,
        "task_id": error.context.task_id,
        "correlation_id": error.correlation_id,
        "timestamp": error.context.timestamp,
    }))
}

/// Monitoring-facing shape with full context, for the health/pattern surface.
pub fn format_monitor(error: &MarcusError) -> Value {
    sanitize::sanitize(&json!({
        "error_code": error.error_code,
        "variant": error.variant.as_str(),
        "category": error.category.as_str(),
        "severity": error.severity.as_str(),
        "retryable": error.retryable,
        "context": {
            "operation": error.context.operation,
            "agent_id": error.context.agent_id,
            "task_id": error.context.task_id,
            "integration_name": error.context.integration_name,
        },
        "correlation_id": error.correlation_id,
    }))
}

/// Full debug dump, including the cause chain — never sent to an external
/// surface, only used for local troubleshooting.
pub fn format_debug(error: &MarcusError) -> Value {
    sanitize::sanitize(&json!({
        "error": error,
    }))
}

/// Summarize a batch of errors from an `ErrorAggregator` into a single MCP
/// response body, for fan-out operations that partially fail.
pub fn format_batch_mcp(aggregator: &ErrorAggregator) -> Value {
    let errors: Vec<Value> = aggregator.errors().iter().map(format_mcp).collect();
    sanitize::sanitize(&json!({
        "error": {
            "code": "BATCH_FAILURE",
            "count": aggregator.len(),
            "worst_severity": aggregator.worst_severity().map(|s| s.as_str()),
            "errors": errors,
        }
    }))
}
