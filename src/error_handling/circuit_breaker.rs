//! Per-dependency circuit breaker, grounded on the teacher's
//! `services/circuit_breaker.rs` `Arc<RwLock<HashMap<..>>>` registry pattern,
//! scoped here by a free-form dependency name (e.g. `"kanban:planka"`,
//! `"ai:claude"`) rather than the teacher's fixed enum of scopes.

use crate::domain::models::config::CircuitBreakerConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<DateTime<Utc>>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            consecutive_successes: 0,
            opened_at: None,
        }
    }
}

/// Thrown instead of invoking the wrapped operation when the circuit is open.
#[derive(Debug, thiserror::Error)]
#[error("circuit open for dependency {scope}")]
pub struct CircuitOpenError {
    pub scope: String,
    /// When the circuit next allows a half-open probe call.
    pub next_attempt_time: Option<DateTime<Utc>>,
}

/// Registry of independent circuit breakers, one per named dependency scope.
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    circuits: Arc<RwLock<HashMap<String, Circuit>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            circuits: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn state(&self, scope: &str) -> CircuitState {
        self.circuits
            .read()
            .await
            .get(scope)
            .map_or(CircuitState::Closed, |c| c.state)
    }

    /// Returns `Err` immediately if the circuit for `scope` is open (unless
    /// the open timeout has elapsed, in which case it transitions to
    /// half-open and this call is let through as a probe).
    pub async fn before_call(&self, scope: &str) -> Result<(), CircuitOpenError> {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(scope.to_string()).or_insert_with(Circuit::new);

        if circuit.state == CircuitState::Open {
            let elapsed = circuit
                .opened_at
                .map(|t| Utc::now().signed_duration_since(t).num_seconds())
                .unwrap_or(i64::MAX);
            if elapsed >= self.config.open_timeout_secs as i64 {
                circuit.state = CircuitState::HalfOpen;
                circuit.consecutive_successes = 0;
                tracing::info!(scope, "circuit transitioning to half-open");
            } else {
                let next_attempt_time = circuit
                    .opened_at
                    .map(|t| t + chrono::Duration::seconds(self.config.open_timeout_secs as i64));
                return Err(CircuitOpenError {
                    scope: scope.to_string(),
                    next_attempt_time,
                });
            }
        }
        Ok(())
    }

    pub async fn record_success(&self, scope: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(scope.to_string()).or_insert_with(Circuit::new);
        circuit.consecutive_failures = 0;
        match circuit.state {
            CircuitState::HalfOpen => {
                circuit.consecutive_successes += 1;
                if circuit.consecutive_successes >= self.config.success_threshold {
                    circuit.state = CircuitState::Closed;
                    circuit.opened_at = None;
                    tracing::info!(scope, "circuit closed after recovery");
                }
            }
            CircuitState::Closed | CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self, scope: &str) {
        let mut circuits = self.circuits.write().await;
        let circuit = circuits.entry(scope.to_string()).or_insert_with(Circuit::new);
        circuit.consecutive_successes = 0;
        circuit.consecutive_failures += 1;

        let should_open = match circuit.state {
            CircuitState::Closed => circuit.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if should_open && circuit.state != CircuitState::Open {
            circuit.state = CircuitState::Open;
            circuit.opened_at = Some(Utc::now());
            tracing::warn!(
                scope,
                consecutive_failures = circuit.consecutive_failures,
                "circuit opened"
            );
        }
    }
}
