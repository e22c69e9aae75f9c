//! Fetch command: crawl the RangeInfo hierarchy into the harvested table.

use anyhow::Context;

use cunli::config::Settings;
use cunli::scrapers::{HierarchyCrawler, HttpClient, RangeInfoApi, RateLimiter, SnapshotStore};
use cunli::storage::write_harvest_file;

use crate::cli::helpers::print_crawl_summary;

/// Crawl every county and write `docs/cunli.csv`.
pub async fn cmd_fetch(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let limiter = RateLimiter::with_config(settings.rate_limit_config());
    let client = HttpClient::new(
        settings.request_timeout(),
        limiter.clone(),
        settings.user_agent.as_deref(),
    )
    .context("Failed to build HTTP client")?;
    let api = RangeInfoApi::new(&settings.api_base)
        .with_context(|| format!("Invalid API base URL: {}", settings.api_base))?;

    let crawler =
        HierarchyCrawler::new(client, api).with_snapshots(SnapshotStore::new(&settings.raw_dir));
    let harvest = crawler.crawl().await.context("Crawl failed")?;

    let output = settings.harvest_path();
    write_harvest_file(&output, &harvest.rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let requests = limiter.get_stats().await;
    print_crawl_summary(&harvest.stats, &requests, &output);
    Ok(())
}
