//! Fallback handler: serves a cached last-known-good value when an
//! integration call fails, per §4.1's fallback chain step.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Caches the last successful result per named key, for use as a fallback
/// when the live call fails and the error is retryable-but-exhausted.
#[derive(Clone)]
pub struct FallbackHandler {
    cache: Arc<RwLock<HashMap<String, Value>>>,
}

impl FallbackHandler {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn remember(&self, key: impl Into<String>, value: Value) {
        self.cache.write().await.insert(key.into(), value);
    }

    pub async fn recall(&self, key: &str) -> Option<Value> {
        self.cache.read().await.get(key).cloned()
    }
}

impl Default for FallbackHandler {
    fn default() -> Self {
        Self::new()
    }
}
