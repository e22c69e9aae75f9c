//! Fixed-interval per-domain rate limiter.
//!
//! Every request to a domain waits until the configured delay has passed
//! since the previous request to that domain finished. There is no adaptive
//! backoff; the limiter only paces.

mod config;
mod domain_state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

pub use config::{DomainStats, RateLimitConfig, DEFAULT_REQUEST_DELAY};
use domain_state::DomainState;

/// Rate limiter that paces requests per domain.
///
/// Clones share state, so one limiter can be handed to several clients.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    domains: Arc<RwLock<HashMap<String, DomainState>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with custom config.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            domains: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Extract domain from URL.
    pub fn extract_domain(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
    }

    /// Wait until the domain is ready, then count the request against it.
    ///
    /// Returns the domain so the caller can report completion.
    pub async fn acquire(&self, url: &str) -> Option<String> {
        let domain = Self::extract_domain(url)?;

        let wait_time = {
            let domains = self.domains.read().await;
            domains
                .get(&domain)
                .map(|s| s.time_until_ready(self.config.delay))
                .unwrap_or(Duration::ZERO)
        };

        if wait_time > Duration::ZERO {
            debug!("Rate limiting {}: waiting {:?}", domain, wait_time);
            tokio::time::sleep(wait_time).await;
        }

        {
            let mut domains = self.domains.write().await;
            domains.entry(domain.clone()).or_default().total_requests += 1;
        }

        Some(domain)
    }

    /// Mark the in-flight request to `domain` as finished.
    ///
    /// Called whether the request succeeded or not; the next request to the
    /// domain waits a full delay from this point.
    pub async fn release(&self, domain: &str) {
        let mut domains = self.domains.write().await;
        domains.entry(domain.to_string()).or_default().last_request = Some(Instant::now());
    }

    /// Get statistics for all domains.
    pub async fn get_stats(&self) -> HashMap<String, DomainStats> {
        let domains = self.domains.read().await;
        domains
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    DomainStats {
                        delay: self.config.delay,
                        total_requests: v.total_requests,
                    },
                )
            })
            .collect()
    }
}
