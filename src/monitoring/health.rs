//! Health report: aggregates recent error history and detected patterns
//! into a single scored/banded datum consumed by `check_assignment_health`
//! and the reconciliation monitor (§4.2, §4.9).

use super::model::{ErrorPattern, ErrorRecord};
use crate::domain::models::config::MonitorConfig;
use crate::error_handling::ErrorSeverity;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub band: HealthBand,
    pub score: f64,
    pub recent_error_count: usize,
    pub critical_error_count: usize,
    pub errors_per_minute: usize,
    pub patterns: Vec<ErrorPattern>,
}

/// Penalty tiers for the 1-minute rolling error rate.
fn rate_penalty(errors_per_minute: usize) -> f64 {
    match errors_per_minute {
        0 => 0.0,
        1..=2 => 5.0,
        3..=5 => 15.0,
        6..=10 => 30.0,
        _ => 50.0,
    }
}

/// Score starts at 100 and is penalized by the 1-minute error rate (tiered),
/// a flat 25 for the presence of any critical error, and 10 per active
/// pattern; banded at 90/75/50/25 (§4.2).
pub fn build_report(records: &[ErrorRecord], config: &MonitorConfig) -> HealthReport {
    let patterns = super::patterns::detect_all(records, config);

    let critical_error_count = records
        .iter()
        .filter(|r| r.severity == ErrorSeverity::Critical)
        .count();

    let one_minute_ago = Utc::now() - Duration::minutes(1);
    let errors_per_minute = records.iter().filter(|r| r.timestamp >= one_minute_ago).count();

    let mut score = 100.0_f64;
    score -= rate_penalty(errors_per_minute);
    if critical_error_count > 0 {
        score -= 25.0;
    }
    score -= patterns.len() as f64 * 10.0;
    let score = score.clamp(0.0, 100.0);

    let band = if score >= 90.0 {
        HealthBand::Excellent
    } else if score >= 75.0 {
        HealthBand::Good
    } else if score >= 50.0 {
        HealthBand::Fair
    } else if score >= 25.0 {
        HealthBand::Poor
    } else {
        HealthBand::Critical
    };

    HealthReport {
        band,
        score,
        recent_error_count: records.len(),
        critical_error_count,
        errors_per_minute,
        patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MonitorConfig {
        MonitorConfig {
            history_capacity: 100,
            frequency_threshold: 10,
            burst_threshold: 15,
            agent_error_threshold: 5,
            cascade_threshold: 5,
            correlation_timeout_minutes: 15,
        }
    }

    #[test]
    fn empty_history_is_excellent() {
        let report = build_report(&[], &config());
        assert_eq!(report.band, HealthBand::Excellent);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn any_critical_error_costs_a_flat_25_points() {
        use crate::error_handling::{ErrorCategory, ErrorVariant};
        use uuid::Uuid;

        let record = ErrorRecord {
            correlation_id: Uuid::new_v4(),
            variant: ErrorVariant::Database,
            category: ErrorCategory::System,
            severity: ErrorSeverity::Critical,
            operation: "kanban.update_task".to_string(),
            agent_id: None,
            task_id: None,
            integration_name: None,
            timestamp: Utc::now() - Duration::minutes(5),
        };
        let report = build_report(&[record], &config());
        assert_eq!(report.score, 75.0);
        assert_eq!(report.band, HealthBand::Good);
    }
}
