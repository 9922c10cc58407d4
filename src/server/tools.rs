//! Tool handlers (§6): one function per entry in the stable tool surface,
//! each taking the raw JSON arguments and returning either a success
//! payload or a `MarcusError` for the dispatcher to shape via C3.

use super::dispatcher::AppState;
use crate::coordination::{AssignmentOutcome, ReportedStatus};
use crate::domain::models::{Task, TaskPriority};
use crate::domain::ports::KanbanProvider;
use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use serde_json::{json, Value};
use std::collections::BTreeSet;

fn require_str<'a>(args: &'a Value, field: &str, operation: &str) -> Result<&'a str, MarcusError> {
    args.get(field).and_then(Value::as_str).ok_or_else(|| {
        MarcusError::new(
            ErrorVariant::Validation,
            format!("missing required field: {field}"),
            ErrorContext::new(operation),
        )
    })
}

pub async fn register_agent(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let agent_id = require_str(args, "agent_id", "register_agent")?;
    let name = require_str(args, "name", "register_agent")?;
    let role = require_str(args, "role", "register_agent")?;
    let skills: BTreeSet<String> = args
        .get("skills")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    state.registry.register(agent_id, name.to_string(), role.to_string(), skills).await;
    state.realtime_log.append("agent_registered", json!({"agent_id": agent_id})).await;

    Ok(json!({"success": true, "agent_id": agent_id}))
}

pub async fn get_agent_status(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let agent_id = require_str(args, "agent_id", "get_agent_status")?;
    let agent = state.registry.get(agent_id).await.ok_or_else(|| {
        MarcusError::new(
            ErrorVariant::Validation,
            format!("unknown agent: {agent_id}"),
            ErrorContext::new("get_agent_status").with_agent(agent_id),
        )
    })?;
    let assignment = state.ledger.get(agent_id).await;

    Ok(json!({
        "success": true,
        "agent": agent,
        "assignment": assignment,
    }))
}

pub async fn list_registered_agents(state: &AppState, _args: &Value) -> Result<Value, MarcusError> {
    let agents = state.registry.list().await;
    Ok(json!({"success": true, "agents": agents}))
}

pub async fn request_next_task(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let agent_id = require_str(args, "agent_id", "request_next_task")?;
    match state.engine.request_next_task(agent_id).await? {
        AssignmentOutcome::Assigned { task, instructions } => {
            state
                .realtime_log
                .append(
                    "assignment_granted",
                    json!({"agent_id": agent_id, "task_id": task.id}),
                )
                .await;
            Ok(json!({"success": true, "task": task, "instructions": instructions}))
        }
        AssignmentOutcome::NoTaskAvailable => {
            state
                .realtime_log
                .append("assignment_denied", json!({"agent_id": agent_id}))
                .await;
            Ok(json!({"success": true, "task": null, "message": "no task available"}))
        }
    }
}

pub async fn report_task_progress(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let agent_id = require_str(args, "agent_id", "report_task_progress")?;
    let task_id = require_str(args, "task_id", "report_task_progress")?;
    let status_str = require_str(args, "status", "report_task_progress")?;
    let progress = args.get("progress").and_then(Value::as_u64).unwrap_or(0) as u8;
    let message = args.get("message").and_then(Value::as_str).unwrap_or("");

    let status = match status_str {
        "in_progress" => ReportedStatus::InProgress,
        "completed" => ReportedStatus::Completed,
        "blocked" => ReportedStatus::Blocked,
        other => {
            return Err(MarcusError::new(
                ErrorVariant::Validation,
                format!("invalid status: {other}"),
                ErrorContext::new("report_task_progress").with_agent(agent_id).with_task(task_id),
            ))
        }
    };

    state.lifecycle.report_progress(agent_id, task_id, status, progress, message).await?;
    state
        .realtime_log
        .append("progress_reported", json!({"agent_id": agent_id, "task_id": task_id, "status": status_str}))
        .await;

    Ok(json!({"success": true}))
}

pub async fn report_blocker(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let agent_id = require_str(args, "agent_id", "report_blocker")?;
    let task_id = require_str(args, "task_id", "report_blocker")?;
    let description = require_str(args, "blocker_description", "report_blocker")?;
    let severity = args.get("severity").and_then(Value::as_str).unwrap_or("medium");

    let advice = state.lifecycle.report_blocker(agent_id, task_id, description, severity).await?;
    state
        .realtime_log
        .append("blocker_reported", json!({"agent_id": agent_id, "task_id": task_id, "severity": severity}))
        .await;

    Ok(json!({"success": true, "advice": advice}))
}

pub async fn get_project_status(state: &AppState, _args: &Value) -> Result<Value, MarcusError> {
    let snapshot = match state.snapshot.current().await {
        Some(s) => s,
        None => state.snapshot.refresh().await?,
    };
    Ok(json!({"success": true, "status": snapshot}))
}

pub async fn create_project(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let project_name = require_str(args, "project_name", "create_project")?;
    let description = require_str(args, "description", "create_project")?;

    let expanded = state.ai.expand_project(project_name, description).await?;
    let mut created = Vec::with_capacity(expanded.tasks.len());
    for item in &expanded.tasks {
        let mut task = Task::new(String::new(), item.name.clone());
        task.description = item.description.clone();
        task.labels = item.labels.iter().cloned().collect();
        task.dependencies = item.dependencies.clone();
        task.estimated_hours = item.estimated_hours;
        task.priority = TaskPriority::from_str(&item.priority).unwrap_or_default();
        let saved = state.kanban.create_task(task).await?;
        created.push(saved);
    }
    state
        .realtime_log
        .append("project_created", json!({"project_name": project_name, "task_count": created.len()}))
        .await;

    Ok(json!({"success": true, "tasks": created, "summary": expanded.summary}))
}

pub async fn add_feature(state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let feature_description = require_str(args, "feature_description", "add_feature")?;
    let integration_point = args.get("integration_point").and_then(Value::as_str).unwrap_or("");

    let expanded = state.ai.expand_project(feature_description, integration_point).await?;
    let mut created = Vec::with_capacity(expanded.tasks.len());
    for item in &expanded.tasks {
        let mut task = Task::new(String::new(), item.name.clone());
        task.description = item.description.clone();
        task.labels = item.labels.iter().cloned().collect();
        task.dependencies = item.dependencies.clone();
        task.estimated_hours = item.estimated_hours;
        task.priority = TaskPriority::from_str(&item.priority).unwrap_or_default();
        let saved = state.kanban.create_task(task).await?;
        created.push(saved);
    }
    state
        .realtime_log
        .append("feature_added", json!({"task_count": created.len()}))
        .await;

    Ok(json!({"success": true, "tasks": created, "summary": expanded.summary}))
}

pub async fn ping(_state: &AppState, args: &Value) -> Result<Value, MarcusError> {
    let echo = args.get("echo").cloned().unwrap_or(Value::Null);
    Ok(json!({"success": true, "status": "online", "echo": echo, "timestamp": chrono::Utc::now()}))
}

pub async fn check_assignment_health(state: &AppState, _args: &Value) -> Result<Value, MarcusError> {
    let sync_state = state.reconciliation.tick().await;
    let records = state.error_monitor.snapshot().await;
    let report = crate::monitoring::build_report(&records, &state.monitor_config);

    Ok(json!({
        "success": true,
        "sync_state": sync_state,
        "health": report,
    }))
}
