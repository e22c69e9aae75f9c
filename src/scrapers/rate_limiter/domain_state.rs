//! Per-domain pacing state.

use std::time::{Duration, Instant};

/// State for a single domain.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// When the last request to this domain finished.
    pub last_request: Option<Instant>,
    /// Total requests made.
    pub total_requests: u64,
}

impl DomainState {
    /// Time until this domain is ready for another request.
    pub fn time_until_ready(&self, delay: Duration) -> Duration {
        match self.last_request {
            Some(last) => delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }
}
