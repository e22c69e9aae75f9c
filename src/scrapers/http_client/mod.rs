//! HTTP fetch capability with per-domain request pacing.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use crate::error::FetchError;

/// Something that turns a URL into raw response bytes.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for &T {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP client that paces every request through a shared rate limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - `user_agent_config`: see [`resolve_user_agent`]
    pub fn new(
        timeout: Duration,
        rate_limiter: RateLimiter,
        user_agent_config: Option<&str>,
    ) -> reqwest::Result<Self> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    async fn send(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!("GET {} -> {} in {:?}", url, status, start.elapsed());

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let domain = self.rate_limiter.acquire(url).await;
        let result = self.send(url).await;
        if let Some(ref domain) = domain {
            self.rate_limiter.release(domain).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::rate_limiter::RateLimitConfig;

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let limiter = RateLimiter::with_config(RateLimitConfig::with_delay(Duration::ZERO));
        let client = HttpClient::new(Duration::from_millis(500), limiter.clone(), None).unwrap();

        let err = client.fetch("http://127.0.0.1:9/Country").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));

        let stats = limiter.get_stats().await;
        assert_eq!(stats.get("127.0.0.1").unwrap().total_requests, 1);
    }
}
