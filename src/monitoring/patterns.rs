//! Pattern detectors run over the monitor's recent history (§4.2):
//! frequency, burst, agent-specific, and cascade detection, each scoped to
//! the time window the spec assigns it rather than the whole history.

use super::model::{ErrorPattern, ErrorRecord, PatternKind};
use crate::domain::models::config::MonitorConfig;
use chrono::{DateTime, Duration, Utc};

/// Run all four detectors over `records`, returning every pattern found.
pub fn detect_all(records: &[ErrorRecord], config: &MonitorConfig) -> Vec<ErrorPattern> {
    let mut patterns = Vec::new();
    patterns.extend(detect_frequency(records, config));
    patterns.extend(detect_burst(records, config));
    patterns.extend(detect_agent_specific(records, config));
    patterns.extend(detect_cascade(records, config));
    patterns
}

/// Same `error_type` count in the last 10 minutes `>= frequency_threshold`.
fn detect_frequency(records: &[ErrorRecord], config: &MonitorConfig) -> Vec<ErrorPattern> {
    let now = Utc::now();
    let window_start = now - Duration::minutes(10);

    let mut by_variant: std::collections::HashMap<_, usize> = std::collections::HashMap::new();
    for r in records.iter().filter(|r| r.timestamp >= window_start) {
        *by_variant.entry(r.variant).or_insert(0) += 1;
    }
    by_variant
        .into_iter()
        .filter(|(_, count)| *count as u32 >= config.frequency_threshold)
        .map(|(variant, count)| ErrorPattern {
            kind: PatternKind::Frequency,
            description: format!("{} occurred {} times in the last 10 minutes", variant.as_str(), count),
            occurrence_count: count,
            window_start,
            window_end: now,
            related_agent_id: None,
            related_variant: Some(variant),
        })
        .collect()
}

/// Total errors (any kind) in the last 5 minutes `>= burst_threshold`.
fn detect_burst(records: &[ErrorRecord], config: &MonitorConfig) -> Vec<ErrorPattern> {
    let now = Utc::now();
    let window_start = now - Duration::minutes(5);
    let count = records.iter().filter(|r| r.timestamp >= window_start).count();

    if count as u32 >= config.burst_threshold {
        vec![ErrorPattern {
            kind: PatternKind::Burst,
            description: format!("{count} errors within 5 minutes"),
            occurrence_count: count,
            window_start,
            window_end: now,
            related_agent_id: None,
            related_variant: None,
        }]
    } else {
        Vec::new()
    }
}

/// A single agent accumulating `>= agent_error_threshold` errors in the last
/// 30 minutes.
fn detect_agent_specific(records: &[ErrorRecord], config: &MonitorConfig) -> Vec<ErrorPattern> {
    let now = Utc::now();
    let window_start = now - Duration::minutes(30);

    let mut by_agent: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for r in records.iter().filter(|r| r.timestamp >= window_start) {
        if let Some(agent_id) = &r.agent_id {
            *by_agent.entry(agent_id.clone()).or_insert(0) += 1;
        }
    }
    by_agent
        .into_iter()
        .filter(|(_, count)| *count as u32 >= config.agent_error_threshold)
        .map(|(agent_id, count)| ErrorPattern {
            kind: PatternKind::AgentSpecific,
            description: format!("agent {agent_id} produced {count} errors in the last 30 minutes"),
            occurrence_count: count,
            window_start,
            window_end: now,
            related_agent_id: Some(agent_id),
            related_variant: None,
        })
        .collect()
}

/// Similarity between two records per §4.2.4's weights: same type 0.4, same
/// operation 0.3, same integration 0.2, within 60s of each other 0.1.
fn similarity(a: &ErrorRecord, b: &ErrorRecord) -> f64 {
    let mut score = 0.0;
    if a.variant == b.variant {
        score += 0.4;
    }
    if a.operation == b.operation {
        score += 0.3;
    }
    if a.integration_name.is_some() && a.integration_name == b.integration_name {
        score += 0.2;
    }
    if (a.timestamp - b.timestamp).num_seconds().abs() <= 60 {
        score += 0.1;
    }
    score
}

/// Over the last 50 errors within 5 minutes of the most recent one, count
/// errors whose similarity to it is `>= 0.7`; `>= cascade_threshold` such
/// errors emits a cascade pattern (§4.2.4).
fn detect_cascade(records: &[ErrorRecord], config: &MonitorConfig) -> Vec<ErrorPattern> {
    if records.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<&ErrorRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);
    let newest = *sorted.last().expect("checked non-empty above");
    let window_start: DateTime<Utc> = newest.timestamp - Duration::minutes(5);

    let similar_count = sorted
        .iter()
        .rev()
        .filter(|r| r.timestamp >= window_start)
        .take(50)
        .filter(|r| r.correlation_id != newest.correlation_id)
        .filter(|r| similarity(newest, r) >= 0.7)
        .count();

    if similar_count as u32 >= config.cascade_threshold {
        vec![ErrorPattern {
            kind: PatternKind::Cascade,
            description: format!(
                "{similar_count} errors similar to the most recent within 5 minutes"
            ),
            occurrence_count: similar_count,
            window_start,
            window_end: newest.timestamp,
            related_agent_id: newest.agent_id.clone(),
            related_variant: Some(newest.variant),
        }]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{ErrorCategory, ErrorSeverity, ErrorVariant};
    use uuid::Uuid;

    fn record(variant: ErrorVariant, agent: Option<&str>, integration: Option<&str>, operation: &str) -> ErrorRecord {
        ErrorRecord {
            correlation_id: Uuid::new_v4(),
            variant,
            category: ErrorCategory::Transient,
            severity: ErrorSeverity::Medium,
            operation: operation.to_string(),
            agent_id: agent.map(String::from),
            task_id: None,
            integration_name: integration.map(String::from),
            timestamp: Utc::now(),
        }
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            history_capacity: 100,
            frequency_threshold: 3,
            burst_threshold: 3,
            agent_error_threshold: 3,
            cascade_threshold: 2,
            correlation_timeout_minutes: 15,
        }
    }

    #[test]
    fn detects_frequency_pattern() {
        let records: Vec<_> = (0..4)
            .map(|_| record(ErrorVariant::NetworkTimeout, None, None, "kanban.get_available_tasks"))
            .collect();
        let patterns = detect_frequency(&records, &config());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::Frequency);
    }

    #[test]
    fn frequency_ignores_errors_outside_the_ten_minute_window() {
        let mut stale: Vec<_> = (0..4)
            .map(|_| record(ErrorVariant::NetworkTimeout, None, None, "kanban.get_available_tasks"))
            .collect();
        for r in &mut stale {
            r.timestamp = Utc::now() - Duration::minutes(11);
        }
        assert!(detect_frequency(&stale, &config()).is_empty());
    }

    #[test]
    fn detects_agent_specific_pattern() {
        let records: Vec<_> = (0..4)
            .map(|_| record(ErrorVariant::Validation, Some("a1"), None, "report_task_progress"))
            .collect();
        let patterns = detect_agent_specific(&records, &config());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].related_agent_id.as_deref(), Some("a1"));
    }

    #[test]
    fn detects_cascade_across_similar_errors() {
        let records = vec![
            record(ErrorVariant::KanbanIntegration, None, Some("kanban"), "kanban.get_available_tasks"),
            record(ErrorVariant::KanbanIntegration, None, Some("kanban"), "kanban.get_available_tasks"),
            record(ErrorVariant::KanbanIntegration, None, Some("kanban"), "kanban.get_available_tasks"),
        ];
        let patterns = detect_cascade(&records, &config());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::Cascade);
        // the newest record compared against the other two, both fully similar.
        assert_eq!(patterns[0].occurrence_count, 2);
    }

    #[test]
    fn dissimilar_errors_do_not_cascade() {
        let records = vec![
            record(ErrorVariant::KanbanIntegration, None, Some("kanban"), "kanban.get_available_tasks"),
            record(ErrorVariant::AiProvider, None, Some("ai"), "ai.generate_task_instructions"),
        ];
        assert!(detect_cascade(&records, &config()).is_empty());
    }

    #[test]
    fn no_patterns_below_thresholds() {
        let records = vec![record(
            ErrorVariant::NetworkTimeout,
            Some("a1"),
            Some("kanban"),
            "kanban.get_available_tasks",
        )];
        assert!(detect_all(&records, &config()).is_empty());
    }
}
