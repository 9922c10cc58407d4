//! The error monitor (C2): recent-error ring buffer, pattern detection,
//! health scoring, and periodic snapshot persistence.

pub mod health;
pub mod model;
pub mod patterns;
pub mod persistence;
pub mod store;

pub use health::{build_report, HealthBand, HealthReport};
pub use model::{ErrorPattern, ErrorRecord, PatternKind};
pub use persistence::SnapshotDaemon;
pub use store::ErrorMonitor;
