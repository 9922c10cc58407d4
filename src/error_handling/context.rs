//! `OperationScope`: an RAII-ish guard that tags every error escaping an
//! operation with consistent context, mirroring the teacher's span-based
//! instrumentation but carrying Marcus's `ErrorContext` instead of just a
//! `tracing::Span`.

use super::taxonomy::{ErrorContext, MarcusError};
use std::future::Future;

/// Wraps a fallible async operation so any `MarcusError` it returns is
/// enriched with this scope's `agent_id`/`task_id`/`integration_name`, and
/// any untagged error is wrapped into one.
pub struct OperationScope {
    context: ErrorContext,
}

impl OperationScope {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            context: ErrorContext::new(operation),
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.context = self.context.with_agent(agent_id);
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.context = self.context.with_task(task_id);
        self
    }

    pub fn with_integration(mut self, name: impl Into<String>) -> Self {
        self.context = self.context.with_integration(name);
        self
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Run `fut`, tagging any error it produces with this scope's context.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, MarcusError>
    where
        F: Future<Output = Result<T, MarcusError>>,
    {
        match fut.await {
            Ok(value) => Ok(value),
            Err(mut err) => {
                err.context.enrich_from(&self.context);
                tracing::warn!(
                    operation = %self.context.operation,
                    error_code = %err.error_code,
                    correlation_id = %err.correlation_id,
                    "operation failed"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::taxonomy::ErrorVariant;

    #[tokio::test]
    async fn run_enriches_agent_and_task_from_scope() {
        let scope = OperationScope::new("request_next_task")
            .with_agent("a1")
            .with_task("t1");

        let result: Result<(), MarcusError> = scope
            .run(async {
                Err(MarcusError::new(
                    ErrorVariant::TaskAssignment,
                    "no candidates",
                    ErrorContext::new("select_candidate"),
                ))
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.context.agent_id.as_deref(), Some("a1"));
        assert_eq!(err.context.task_id.as_deref(), Some("t1"));
    }
}
