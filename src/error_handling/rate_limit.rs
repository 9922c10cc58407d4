//! Outbound call rate limiting. The teacher's `Cargo.toml` declares
//! `governor` as a resilience primitive but no teacher module actually
//! constructs a limiter with it; this wires it up for real against
//! `RateLimitConfig`'s `requests_per_second`/`burst_size` (§5).

use crate::domain::models::config::RateLimitConfig;
use governor::{Quota, RateLimiter as GovernorLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type Limiter = GovernorLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>;

/// Token-bucket limiter shared across every outbound kanban/AI call site.
#[derive(Clone)]
pub struct CallRateLimiter {
    inner: Arc<Limiter>,
}

impl CallRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second.ceil() as u32).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        Self {
            inner: Arc::new(GovernorLimiter::direct(quota)),
        }
    }

    /// Block until a call slot is available.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_never_panics_under_default_config() {
        let limiter = CallRateLimiter::new(&RateLimitConfig::default());
        limiter.acquire().await;
        limiter.acquire().await;
    }

    #[tokio::test]
    async fn tiny_quota_still_grants_after_waiting() {
        let limiter = CallRateLimiter::new(&RateLimitConfig {
            requests_per_second: 1000.0,
            burst_size: 1,
        });
        limiter.acquire().await;
        limiter.acquire().await;
    }
}
