//! Core coordination logic: ledger (C5), registry (C6), assignment engine
//! (C7), task lifecycle (C8), reconciliation (C9), and project snapshot (C11).

pub mod engine;
pub mod ledger;
pub mod lifecycle;
pub mod reconciliation;
pub mod registry;
pub mod snapshot;

pub use engine::{AssignmentEngine, AssignmentOutcome, ScoringWeights};
pub use ledger::AssignmentLedger;
pub use lifecycle::{ReportedStatus, TaskLifecycle};
pub use reconciliation::{ReconciliationMonitor, SyncState};
pub use registry::AgentRegistry;
pub use snapshot::{ProjectStateSnapshot, RiskLevel, SnapshotCache};
