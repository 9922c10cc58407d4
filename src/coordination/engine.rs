//! Assignment engine (C7) — the hard core: given an agent, pick the single
//! best available task with strict at-most-one-owner guarantees under
//! concurrent requests (§4.7).
//!
//! Scoring is grounded on the teacher's `PriorityCalculator`
//! (`services/priority_calculator.rs`): a small struct holding tunable
//! weights with a `calculate` method, generalized here from
//! `(base_priority, dependency_depth, deadline)` to
//! `(skill_match, priority_weight, age_boost)`.

use crate::coordination::ledger::AssignmentLedger;
use crate::coordination::registry::AgentRegistry;
use crate::domain::models::Task;
use crate::domain::ports::{AiAdapter, KanbanProvider};
use crate::error_handling::{
    CallRateLimiter, CircuitBreakerRegistry, ErrorContext, ErrorVariant, MarcusError, RetryPolicy,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Tunable scoring weights, mirroring the teacher's `PriorityCalculator`
/// shape so the formula can be adjusted without touching selection logic.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub skill: f64,
    pub priority: f64,
    pub age: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.5,
            priority: 0.4,
            age: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Age is normalized against a one-day horizon and capped at 1.0; this
    /// resolves the spec's age-boost description into a concrete formula
    /// (see DESIGN.md's Open Question notes).
    pub fn score(&self, task: &Task, agent_skills: &std::collections::BTreeSet<String>) -> f64 {
        let skill_match = if task.labels.is_empty() {
            0.0
        } else {
            let overlap = task.labels.intersection(agent_skills).count();
            overlap as f64 / task.labels.len().max(1) as f64
        };
        let priority_weight = task.priority.weight();
        let age_hours = Utc::now().signed_duration_since(task.created_at).num_minutes() as f64 / 60.0;
        let age_boost = (age_hours / 24.0).min(1.0).max(0.0);

        self.skill * skill_match + self.priority * priority_weight + self.age * age_boost
    }
}

/// Outcome of `AssignmentEngine::request_next_task`.
pub enum AssignmentOutcome {
    Assigned {
        task: Task,
        instructions: Option<String>,
    },
    NoTaskAvailable,
}

pub struct AssignmentEngine {
    ledger: Arc<AssignmentLedger>,
    registry: AgentRegistry,
    kanban: Arc<dyn KanbanProvider>,
    ai: Arc<dyn AiAdapter>,
    circuit_breakers: Arc<CircuitBreakerRegistry>,
    retry_policy: RetryPolicy,
    rate_limiter: CallRateLimiter,
    weights: ScoringWeights,
    assignment_lock: Arc<Mutex<()>>,
    tasks_being_assigned: Arc<RwLock<HashSet<String>>>,
}

impl AssignmentEngine {
    pub fn new(
        ledger: Arc<AssignmentLedger>,
        registry: AgentRegistry,
        kanban: Arc<dyn KanbanProvider>,
        ai: Arc<dyn AiAdapter>,
        circuit_breakers: Arc<CircuitBreakerRegistry>,
        retry_policy: RetryPolicy,
        rate_limiter: CallRateLimiter,
    ) -> Self {
        Self {
            ledger,
            registry,
            kanban,
            ai,
            circuit_breakers,
            retry_policy,
            rate_limiter,
            weights: ScoringWeights::default(),
            assignment_lock: Arc::new(Mutex::new(())),
            tasks_being_assigned: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    fn kanban_scope(&self) -> String {
        format!("kanban:{}", self.kanban.provider_name())
    }

    async fn fetch_available_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        let scope = self.kanban_scope();
        self.rate_limiter.acquire().await;
        self.circuit_breakers
            .before_call(&scope)
            .await
            .map_err(|e| self.circuit_open_error(&scope, "kanban.get_available_tasks", &e))?;

        let kanban = self.kanban.clone();
        let result = self.retry_policy.run(|| {
            let kanban = kanban.clone();
            async move { kanban.get_available_tasks().await }
        }).await;

        match &result {
            Ok(_) => self.circuit_breakers.record_success(&scope).await,
            Err(_) => self.circuit_breakers.record_failure(&scope).await,
        }
        result
    }

    /// List every task on the board regardless of status, used to resolve
    /// dependency done-ness (§4.7 step 3) — unlike `fetch_available_tasks`,
    /// the assignment-eligible subset can never contain a `Done` task, so
    /// dependency resolution must look at the whole board instead.
    async fn fetch_all_tasks(&self) -> Result<Vec<Task>, MarcusError> {
        let scope = self.kanban_scope();
        self.rate_limiter.acquire().await;
        self.circuit_breakers
            .before_call(&scope)
            .await
            .map_err(|e| self.circuit_open_error(&scope, "kanban.get_all_tasks", &e))?;

        let kanban = self.kanban.clone();
        let result = self.retry_policy.run(|| {
            let kanban = kanban.clone();
            async move { kanban.get_all_tasks().await }
        }).await;

        match &result {
            Ok(_) => self.circuit_breakers.record_success(&scope).await,
            Err(_) => self.circuit_breakers.record_failure(&scope).await,
        }
        result
    }

    /// Wrap a tripped circuit breaker as the `KanbanIntegration` error the
    /// spec requires, with `remediation.next_attempt_time` set from the
    /// circuit's own accounting (§4.1's circuit breaker contract).
    fn circuit_open_error(&self, scope: &str, operation: &str, open: &crate::error_handling::CircuitOpenError) -> MarcusError {
        MarcusError::new(
            ErrorVariant::KanbanIntegration,
            open.to_string(),
            ErrorContext::new(operation).with_integration(scope),
        )
        .with_remediation(crate::error_handling::Remediation {
            next_attempt_time: open.next_attempt_time.map(|t| t.to_rfc3339()),
            ..Default::default()
        })
    }

    /// Select the single best task for `agent_id` from `candidates`, per the
    /// selection algorithm in §4.7 steps 2-5. Returns `None` if no candidate
    /// is eligible.
    fn select_candidate<'a>(
        &self,
        candidates: &'a [Task],
        agent_skills: &std::collections::BTreeSet<String>,
        excluded_ids: &HashSet<String>,
        done_ids: &HashSet<String>,
    ) -> Option<&'a Task> {
        candidates
            .iter()
            .filter(|t| !excluded_ids.contains(&t.id))
            .filter(|t| t.dependencies.iter().all(|dep| done_ids.contains(dep)))
            .max_by(|a, b| {
                let score_a = self.weights.score(a, agent_skills);
                let score_b = self.weights.score(b, agent_skills);
                score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.id.cmp(&a.id)) // reverse so smaller id wins on tie
            })
    }

    /// Run the full selection-reserve-commit cycle, retrying on reservation
    /// loss up to `max_attempts` times (bounded, >= 3 per §4.7).
    pub async fn request_next_task(&self, agent_id: &str) -> Result<AssignmentOutcome, MarcusError> {
        let agent = self.registry.get(agent_id).await.ok_or_else(|| {
            MarcusError::new(
                ErrorVariant::Validation,
                format!("unknown agent: {agent_id}"),
                ErrorContext::new("request_next_task").with_agent(agent_id),
            )
        })?;

        const MAX_ATTEMPTS: u32 = 3;
        for _attempt in 0..MAX_ATTEMPTS {
            let available = self.fetch_available_tasks().await?;
            let board = self.fetch_all_tasks().await?;
            let done_ids: HashSet<String> = board
                .iter()
                .filter(|t| t.status == crate::domain::models::TaskStatus::Done)
                .map(|t| t.id.clone())
                .collect();

            let assigned_ids = self.ledger.get_all_assigned_task_ids().await;
            let reserved_ids = self.tasks_being_assigned.read().await.clone();
            let excluded: HashSet<String> = assigned_ids.union(&reserved_ids).cloned().collect();

            let Some(candidate) = self.select_candidate(&available, &agent.skills, &excluded, &done_ids) else {
                return Ok(AssignmentOutcome::NoTaskAvailable);
            };
            let task_id = candidate.id.clone();
            let mut task = candidate.clone();

            // Reserve.
            {
                let mut reserved = self.tasks_being_assigned.write().await;
                if reserved.contains(&task_id) {
                    continue; // lost the race before we could even reserve
                }
                reserved.insert(task_id.clone());
            }

            let commit_result = self.commit_assignment(agent_id, &mut task).await;

            // Release reservation regardless of outcome.
            self.tasks_being_assigned.write().await.remove(&task_id);

            match commit_result {
                Ok(()) => {
                    self.registry.add_current_task(agent_id, &task_id).await;
                    let instructions = self.best_effort_instructions(&task, agent_id).await;
                    return Ok(AssignmentOutcome::Assigned { task, instructions });
                }
                Err(err) if err.variant == ErrorVariant::StateConflict => {
                    // another request won the ledger race; retry selection.
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(AssignmentOutcome::NoTaskAvailable)
    }

    /// Commit step: under the assignment lock, write the ledger entry, then
    /// push the status update and assignment comment to the board. On
    /// kanban failure after a successful ledger insert, compensate by
    /// removing the ledger entry (§4.7 failure semantics).
    async fn commit_assignment(&self, agent_id: &str, task: &mut Task) -> Result<(), MarcusError> {
        let _guard = self.assignment_lock.lock().await;

        self.ledger
            .add(agent_id, &task.id, crate::domain::models::TaskStatus::Todo)
            .await?;

        task.status = crate::domain::models::TaskStatus::InProgress;
        task.assigned_to = Some(agent_id.to_string());

        if let Err(update_err) = self.kanban.update_task(task).await {
            self.ledger.remove(agent_id).await.ok();
            return Err(update_err);
        }

        self.kanban
            .add_comment(&task.id, &format!("assigned to {agent_id}"))
            .await
            .ok(); // comment failure is logged upstream, not fatal to the assignment

        Ok(())
    }

    /// Ask the AI adapter for instructions; failure is non-fatal and simply
    /// absent from the response (§4.7 step 8).
    async fn best_effort_instructions(&self, task: &Task, agent_id: &str) -> Option<String> {
        let scope = format!("ai:{}", self.ai.provider_name());
        self.rate_limiter.acquire().await;
        if self.circuit_breakers.before_call(&scope).await.is_err() {
            return None;
        }
        let context = format!("assigned to agent {agent_id}");
        match self.ai.generate_task_instructions(task, &context).await {
            Ok(text) => {
                self.circuit_breakers.record_success(&scope).await;
                Some(text)
            }
            Err(err) => {
                self.circuit_breakers.record_failure(&scope).await;
                tracing::warn!(error = %err, "failed to generate task instructions");
                None
            }
        }
    }
}
