//! Append-only JSONL realtime event log (§4.10/§6): one line per externally
//! observable action (register, assignment granted/denied, progress,
//! blocker, reconciliation correction, circuit state change, pattern
//! detected).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
struct RealtimeEvent {
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(flatten)]
    payload: Value,
}

/// Line-buffered append-only writer, guarded by a mutex since multiple tool
/// calls may emit events concurrently.
pub struct RealtimeLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RealtimeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, event_type: &str, payload: Value) {
        let event = RealtimeEvent {
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            payload,
        };
        let Ok(mut line) = serde_json::to_vec(&event) else {
            return;
        };
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let file = tokio::fs::OpenOptions::new().create(true).append(true).open(&self.path).await;
        match file {
            Ok(mut f) => {
                if let Err(err) = f.write_all(&line).await {
                    tracing::warn!(error = %err, "failed to append realtime log event");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to open realtime log file"),
        }
    }
}
