//! Rate limiter configuration and types.

use std::time::Duration;

/// Default pause between consecutive requests to the same host.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Configuration for request pacing.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Fixed pause enforced between the end of one request and the start of
    /// the next one to the same domain.
    pub delay: Duration,
}

impl RateLimitConfig {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

/// Requests made to one domain during a run.
#[derive(Debug, Clone)]
pub struct DomainStats {
    pub delay: Duration,
    pub total_requests: u64,
}
