//! Error aggregation for batch/fan-out operations (§4.1).

use super::taxonomy::{ErrorCategory, ErrorSeverity, MarcusError};
use std::collections::HashMap;

/// Collects errors from a batch of independent sub-operations and summarizes
/// them for a single response, rather than surfacing only the first failure.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<MarcusError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: MarcusError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[MarcusError] {
        &self.errors
    }

    /// The highest severity among collected errors, if any.
    pub fn worst_severity(&self) -> Option<ErrorSeverity> {
        self.errors.iter().map(|e| e.severity).max()
    }

    pub fn by_category(&self) -> HashMap<ErrorCategory, usize> {
        let mut counts = HashMap::new();
        for err in &self.errors {
            *counts.entry(err.category).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::taxonomy::{ErrorContext, ErrorVariant};

    #[test]
    fn worst_severity_picks_maximum() {
        let mut agg = ErrorAggregator::new();
        agg.push(MarcusError::new(
            ErrorVariant::NetworkTimeout,
            "timeout",
            ErrorContext::new("op"),
        ));
        agg.push(MarcusError::new(
            ErrorVariant::Authorization,
            "denied",
            ErrorContext::new("op"),
        ));
        assert_eq!(agg.worst_severity(), Some(ErrorSeverity::Critical));
    }

    #[test]
    fn by_category_counts_each_bucket() {
        let mut agg = ErrorAggregator::new();
        agg.push(MarcusError::new(
            ErrorVariant::NetworkTimeout,
            "t1",
            ErrorContext::new("op"),
        ));
        agg.push(MarcusError::new(
            ErrorVariant::RateLimit,
            "t2",
            ErrorContext::new("op"),
        ));
        let counts = agg.by_category();
        assert_eq!(counts.get(&ErrorCategory::Transient), Some(&2));
    }
}
