//! The error substrate (C1): taxonomy, scoped context tagging, retry,
//! per-dependency circuit breakers, fallback cache, and batch aggregation.

pub mod aggregator;
pub mod circuit_breaker;
pub mod context;
pub mod fallback;
pub mod rate_limit;
pub mod retry;
pub mod taxonomy;

pub use aggregator::ErrorAggregator;
pub use circuit_breaker::{CircuitBreakerRegistry, CircuitOpenError, CircuitState};
pub use context::OperationScope;
pub use fallback::FallbackHandler;
pub use rate_limit::CallRateLimiter;
pub use retry::RetryPolicy;
pub use taxonomy::{ErrorCategory, ErrorContext, ErrorSeverity, ErrorVariant, MarcusError, Remediation};
