//! Exponential-backoff retry policy for retryable errors, generalized from
//! the teacher's `infrastructure/claude/retry.rs` to cover both kanban and
//! AI adapter calls (§4.1's retry contract).

use super::taxonomy::{MarcusError, Remediation};
use crate::domain::models::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff: `base_delay * multiplier^(attempt - 1)`, capped at
/// `max_delay`, up to `max_attempts` total tries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            multiplier: cfg.multiplier,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.base_delay.as_millis() as f64 * exp) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }

    /// Run `op`, retrying on `retryable` errors up to `max_attempts` times
    /// with exponential backoff between attempts. Non-retryable errors
    /// return immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, MarcusError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MarcusError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.retryable && attempt < self.max_attempts => {
                    tracing::debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error_code = %err.error_code,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(self.delay_for_attempt(attempt)).await;
                    attempt += 1;
                }
                Err(err) if err.retryable => {
                    tracing::warn!(
                        attempts = attempt,
                        error_code = %err.error_code,
                        "exhausted retry attempts"
                    );
                    let context = err.context.clone();
                    return Err(MarcusError::wrap_untagged(&err, context).with_remediation(Remediation {
                        retry_strategy: Some(format!("exhausted {attempt} attempts")),
                        ..Default::default()
                    }));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::taxonomy::{ErrorContext, ErrorVariant};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::from(&RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
        })
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let p = policy();
        assert_eq!(p.delay_for_attempt(1), Duration::from_millis(1));
        assert_eq!(p.delay_for_attempt(2), Duration::from_millis(2));
        assert_eq!(p.delay_for_attempt(3), Duration::from_millis(4));
        // attempt 4 would be 8ms, clamped to max_delay of 5ms.
        assert_eq!(p.delay_for_attempt(4), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = AtomicU32::new(0);
        let result = policy()
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(MarcusError::new(
                        ErrorVariant::NetworkTimeout,
                        "timeout",
                        ErrorContext::new("kanban.get_available_tasks"),
                    ))
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausting_attempts_wraps_last_failure_with_remediation() {
        let calls = AtomicU32::new(0);
        let result: Result<(), MarcusError> = policy()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MarcusError::new(
                    ErrorVariant::NetworkTimeout,
                    "still timing out",
                    ErrorContext::new("kanban.get_available_tasks"),
                ))
            })
            .await;
        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.variant, ErrorVariant::ExternalService);
        assert_eq!(err.cause.as_deref(), Some("[NETWORK_TIMEOUT] still timing out"));
        assert_eq!(err.remediation.retry_strategy.as_deref(), Some("exhausted 3 attempts"));
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), MarcusError> = policy()
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(MarcusError::new(
                    ErrorVariant::Validation,
                    "bad input",
                    ErrorContext::new("report_task_progress"),
                ))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
