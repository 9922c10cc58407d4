//! C10: the MCP-shaped stdio JSON-RPC dispatcher. Grounded on the teacher's
//! `adapters/mcp/stdio_server.rs` — newline-delimited JSON-RPC 2.0 over
//! stdin/stdout, `tools/list` + `tools/call` dispatch, `{content:[...]}`
//! tool-result envelopes.

use super::realtime_log::RealtimeLog;
use super::tools;
use crate::coordination::{AgentRegistry, AssignmentEngine, AssignmentLedger, ReconciliationMonitor, SnapshotCache, TaskLifecycle};
use crate::domain::models::config::MonitorConfig;
use crate::domain::ports::{AiAdapter, KanbanProvider};
use crate::error_handling::{ErrorContext, ErrorVariant, MarcusError};
use crate::formatting;
use crate::monitoring::ErrorMonitor;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Bundle of everything a tool handler needs. Cheap to `Clone` — every field
/// is an `Arc` or an already-`Clone`-able handle.
#[derive(Clone)]
pub struct AppState {
    pub registry: AgentRegistry,
    pub ledger: Arc<AssignmentLedger>,
    pub kanban: Arc<dyn KanbanProvider>,
    pub ai: Arc<dyn AiAdapter>,
    pub engine: Arc<AssignmentEngine>,
    pub lifecycle: Arc<TaskLifecycle>,
    pub reconciliation: Arc<ReconciliationMonitor>,
    pub snapshot: Arc<SnapshotCache>,
    pub error_monitor: Arc<ErrorMonitor>,
    pub monitor_config: MonitorConfig,
    pub realtime_log: Arc<RealtimeLog>,
}

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Static tool catalog returned by `tools/list`, per §6's table.
fn tool_catalog() -> Value {
    json!([
        {
            "name": "register_agent",
            "description": "Register a worker agent with its skills and role.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "agent_id": {"type": "string"},
                    "name": {"type": "string"},
                    "role": {"type": "string"},
                    "skills": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["agent_id", "name", "role"]
            }
        },
        {
            "name": "get_agent_status",
            "description": "Fetch a registered agent's roster entry and current assignment.",
            "inputSchema": {
                "type": "object",
                "properties": {"agent_id": {"type": "string"}},
                "required": ["agent_id"]
            }
        },
        {
            "name": "list_registered_agents",
            "description": "List every registered agent.",
            "inputSchema": {"type": "object", "properties": {}}
        },
        {
            "name": "request_next_task",
            "description": "Request the next best-matching task for an agent.",
            "inputSchema": {
                "type": "object",
                "properties": {"agent_id": {"type": "string"}},
                "required": ["agent_id"]
            }
        },
        {
            "name": "report_task_progress",
            "description": "Report progress, completion, or a blocked state for an owned task.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "agent_id": {"type": "string"},
                    "task_id": {"type": "string"},
                    "status": {"type": "string", "enum": ["in_progress", "completed", "blocked"]},
                    "progress": {"type": "integer"},
                    "message": {"type": "string"}
                },
                "required": ["agent_id", "task_id", "status"]
            }
        },
        {
            "name": "report_blocker",
            "description": "Report a blocker on an owned task and receive AI-assisted remediation advice.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "agent_id": {"type": "string"},
                    "task_id": {"type": "string"},
                    "blocker_description": {"type": "string"},
                    "severity": {"type": "string", "enum": ["low", "medium", "high", "critical"]}
                },
                "required": ["agent_id", "task_id", "blocker_description"]
            }
        },
        {
            "name": "get_project_status",
            "description": "Fetch the cached project-state aggregate (progress, velocity, risk).",
            "inputSchema": {"type": "object", "properties": {}}
        },
        {
            "name": "create_project",
            "description": "Expand a project description into concrete tasks via the AI adapter and create them on the board.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "project_name": {"type": "string"},
                    "description": {"type": "string"}
                },
                "required": ["project_name", "description"]
            }
        },
        {
            "name": "add_feature",
            "description": "Expand a feature description into concrete tasks and create them on the board.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "feature_description": {"type": "string"},
                    "integration_point": {"type": "string"}
                },
                "required": ["feature_description"]
            }
        },
        {
            "name": "ping",
            "description": "Liveness check; echoes back an optional payload.",
            "inputSchema": {"type": "object", "properties": {"echo": {}}}
        },
        {
            "name": "check_assignment_health",
            "description": "Run a reconciliation pass and report the current error-monitor health.",
            "inputSchema": {"type": "object", "properties": {}}
        }
    ])
}

fn success_response(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn error_response(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message.into()}})
}

fn tool_success_envelope(payload: Value) -> Value {
    json!({"content": [{"type": "text", "text": payload.to_string()}]})
}

fn tool_error_envelope(error: &MarcusError) -> Value {
    let mut body = tool_success_envelope(formatting::format_mcp(error));
    body["isError"] = json!(true);
    body
}

async fn dispatch_tool(state: &AppState, name: &str, args: &Value) -> Result<Value, MarcusError> {
    let scope = ErrorContext::new(format!("tools/call:{name}"));
    let result = match name {
        "register_agent" => tools::register_agent(state, args).await,
        "get_agent_status" => tools::get_agent_status(state, args).await,
        "list_registered_agents" => tools::list_registered_agents(state, args).await,
        "request_next_task" => tools::request_next_task(state, args).await,
        "report_task_progress" => tools::report_task_progress(state, args).await,
        "report_blocker" => tools::report_blocker(state, args).await,
        "get_project_status" => tools::get_project_status(state, args).await,
        "create_project" => tools::create_project(state, args).await,
        "add_feature" => tools::add_feature(state, args).await,
        "ping" => tools::ping(state, args).await,
        "check_assignment_health" => tools::check_assignment_health(state, args).await,
        other => Err(MarcusError::new(
            ErrorVariant::Validation,
            format!("unknown tool: {other}"),
            ErrorContext::new("tools/call"),
        )),
    };

    if let Err(ref err) = result {
        let mut enriched = err.clone();
        enriched.context.enrich_from(&scope);
        state.error_monitor.record(&enriched).await;
        return Err(enriched);
    }
    result
}

async fn handle_tools_call(state: &AppState, params: &Value) -> Value {
    let name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let empty = json!({});
    let args = params.get("arguments").unwrap_or(&empty);

    match dispatch_tool(state, name, args).await {
        Ok(payload) => tool_success_envelope(payload),
        Err(err) => tool_error_envelope(&err),
    }
}

fn handle_initialize() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {"tools": {}},
        "serverInfo": {"name": "marcus", "version": env!("CARGO_PKG_VERSION")},
    })
}

/// Handle one parsed JSON-RPC request, returning `None` for notifications
/// (no `id`, no response expected).
async fn handle_message(state: &AppState, message: Value) -> Option<Value> {
    let id = message.get("id").cloned();
    let method = message.get("method").and_then(Value::as_str).unwrap_or("");
    let params = message.get("params").cloned().unwrap_or(json!({}));

    let id = match id {
        Some(id) => id,
        None => {
            // notifications (e.g. `notifications/initialized`) get no response
            return None;
        }
    };

    let result = match method {
        "initialize" => success_response(id, handle_initialize()),
        "tools/list" => success_response(id, json!({"tools": tool_catalog()})),
        "tools/call" => success_response(id, handle_tools_call(state, &params).await),
        other => error_response(id, -32601, format!("method not found: {other}")),
    };
    Some(result)
}

/// Run the stdio JSON-RPC loop until stdin closes.
pub async fn run(state: AppState) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin).lines();

    while let Some(line) = reader.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse JSON-RPC request");
                continue;
            }
        };

        if let Some(response) = handle_message(&state, message).await {
            let mut out = serde_json::to_vec(&response).unwrap_or_default();
            out.push(b'\n');
            stdout.write_all(&out).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
