//! `ErrorMonitor`: bounded in-memory ring buffer of recent errors, guarded by
//! a single mutex. Grounded on the teacher's memory/history stores that cap
//! retention by count rather than by time.

use super::model::ErrorRecord;
use crate::error_handling::MarcusError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ErrorMonitor {
    capacity: usize,
    history: Arc<RwLock<VecDeque<ErrorRecord>>>,
}

impl ErrorMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            history: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(1024)))),
        }
    }

    pub async fn record(&self, error: &MarcusError) {
        let record = ErrorRecord {
            correlation_id: error.correlation_id,
            variant: error.variant,
            category: error.category,
            severity: error.severity,
            operation: error.context.operation.clone(),
            agent_id: error.context.agent_id.clone(),
            task_id: error.context.task_id.clone(),
            integration_name: error.context.integration_name.clone(),
            timestamp: error.context.timestamp,
        };
        let mut history = self.history.write().await;
        if history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(record);
    }

    pub async fn snapshot(&self) -> Vec<ErrorRecord> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.history.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replace the buffer's contents wholesale, used when restoring a
    /// persisted snapshot on startup.
    pub async fn restore(&self, records: Vec<ErrorRecord>) {
        let mut history = self.history.write().await;
        history.clear();
        for record in records.into_iter().rev().take(self.capacity).rev() {
            history.push_back(record);
        }
    }
}
