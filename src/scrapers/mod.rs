//! RangeInfo API harvesting: fetch capability, pacing, payload decoding and
//! the hierarchy crawl.

pub mod hierarchy;
pub mod http_client;
pub mod packed;
pub mod payload;
pub mod rate_limiter;
pub mod snapshot;

pub use hierarchy::{CrawlStats, Harvest, HierarchyCrawler, RangeInfoApi, DEFAULT_API_BASE};
pub use http_client::{Fetch, HttpClient};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use snapshot::SnapshotStore;
