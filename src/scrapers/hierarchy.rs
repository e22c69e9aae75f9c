//! Recursive county → township → village crawl of the RangeInfo API.
//!
//! Every level is walked by the same [`HierarchyCrawler::expand`] step: fetch
//! the node's range payload, decode the packed `info` entries, then either
//! emit them as village rows (leaf level) or expand each entry that reports
//! children. The root county list is the only fatal fetch.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info, warn};
use url::Url;

use super::http_client::Fetch;
use super::payload::{parse_counties, parse_range};
use super::snapshot::SnapshotStore;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{HarvestRow, Region, RegionLevel};

/// Default RangeInfo service root.
pub const DEFAULT_API_BASE: &str = "https://service.taipower.com.tw/psvs1/nj_psvs_attr/RangeInfo";

/// Snapshot filename of the root county list.
pub const COUNTIES_SNAPSHOT: &str = "counties.json";

/// URL builder for the RangeInfo endpoints.
#[derive(Debug, Clone)]
pub struct RangeInfoApi {
    country: Url,
    range: Url,
}

impl RangeInfoApi {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        let root = Url::parse(&format!("{}/", base.trim_end_matches('/')))?;
        Ok(Self {
            country: root.join("Country")?,
            range: root.join("rangeFG")?,
        })
    }

    /// Root county list.
    pub fn county_url(&self) -> String {
        self.country.to_string()
    }

    /// Child range payload of the node addressed by `(gid, fcid)`.
    pub fn range_url(&self, gid: &str, fcid: &str) -> String {
        let mut url = self.range.clone();
        url.query_pairs_mut()
            .append_pair("gid", gid)
            .append_pair("fcid", fcid);
        url.to_string()
    }
}

/// Counters collected during a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub counties: usize,
    pub expanded: usize,
    pub skipped_branches: usize,
    pub rows: usize,
}

/// Result of a completed crawl: rows sorted by `gid`.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub rows: Vec<HarvestRow>,
    pub stats: CrawlStats,
}

/// Sort rows ascending by `gid` (byte-wise string order, stable).
pub fn sort_by_gid(rows: &mut [HarvestRow]) {
    rows.sort_by(|a, b| a.gid.cmp(&b.gid));
}

type ExpandFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Sequential crawler over the RangeInfo hierarchy.
pub struct HierarchyCrawler<F> {
    fetcher: F,
    api: RangeInfoApi,
    snapshots: SnapshotStore,
}

impl<F: Fetch> HierarchyCrawler<F> {
    pub fn new(fetcher: F, api: RangeInfoApi) -> Self {
        Self {
            fetcher,
            api,
            snapshots: SnapshotStore::disabled(),
        }
    }

    /// Write every fetched payload to `snapshots` before parsing it.
    pub fn with_snapshots(mut self, snapshots: SnapshotStore) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Crawl the whole hierarchy.
    ///
    /// Fails only when the root county list cannot be fetched or parsed.
    pub async fn crawl(&self) -> PipelineResult<Harvest> {
        let url = self.api.county_url();
        info!("Fetching counties from {}", url);

        let body = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(PipelineError::RootFetch)?;
        self.snapshots.save(COUNTIES_SNAPSHOT, &body);

        let counties = parse_counties(&body)?;
        info!("Found {} counties", counties.len());

        let mut harvest = Harvest::default();
        harvest.stats.counties = counties.len();

        for county in &counties {
            info!(
                "Fetching data for county: {} (gid: {}, fcid: {})",
                county.name, county.gid, county.fcid
            );
            let path = vec![county.name.clone()];
            self.expand(county, path, &mut harvest).await;
        }

        sort_by_gid(&mut harvest.rows);
        harvest.stats.rows = harvest.rows.len();
        info!(
            "Crawl complete: {} rows from {} expansions ({} branches skipped)",
            harvest.stats.rows, harvest.stats.expanded, harvest.stats.skipped_branches
        );
        Ok(harvest)
    }

    /// Fetch `node`'s children and either emit them as rows or recurse.
    ///
    /// `path` holds the names from the county down to `node` inclusive.
    fn expand<'a>(
        &'a self,
        node: &'a Region,
        path: Vec<String>,
        harvest: &'a mut Harvest,
    ) -> ExpandFuture<'a> {
        Box::pin(async move {
            let Some(child_level) = node.level.child() else {
                return;
            };
            if node.level.depth() >= RegionLevel::MAX_DEPTH {
                return;
            }

            let url = self.api.range_url(&node.gid, &node.fcid);
            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        "Failed to fetch {} data for {}: {}",
                        node.level.as_str(),
                        node.name,
                        e
                    );
                    harvest.stats.skipped_branches += 1;
                    return;
                }
            };

            let snapshot =
                SnapshotStore::node_filename(node.level.snapshot_prefix(), &node.gid, &node.fcid);
            self.snapshots.save(&snapshot, &body);

            let entries = match parse_range(&body) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "Failed to parse {} JSON for {}: {}",
                        node.level.as_str(),
                        node.name,
                        e
                    );
                    harvest.stats.skipped_branches += 1;
                    return;
                }
            };
            harvest.stats.expanded += 1;
            info!(
                "Found {} {} entries in {}, saved to {}",
                entries.len(),
                child_level.as_str(),
                node.name,
                snapshot
            );

            if child_level.is_leaf() {
                let [county, town] = path.as_slice() else {
                    warn!(
                        "Unexpected hierarchy path {:?} at {}; dropping {} entries",
                        path,
                        node.name,
                        entries.len()
                    );
                    return;
                };
                harvest.rows.extend(
                    entries
                        .iter()
                        .map(|entry| HarvestRow::from_entry(county, town, entry)),
                );
                return;
            }

            for entry in &entries {
                if !entry.has_children() {
                    debug!("{} has no children, not expanding", entry.name);
                    continue;
                }
                info!(
                    "  Fetching next level data for: {} (gid: {}, fcid: {}, c0: {}, c1: {})",
                    entry.name, entry.gid, entry.fcid, entry.c0, entry.c1
                );
                let child = entry.to_region(child_level);
                let mut child_path = path.clone();
                child_path.push(child.name.clone());
                self.expand(&child, child_path, harvest).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::FetchError;

    /// Serves canned bodies and records every requested URL.
    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: String, body: &str) -> Self {
            self.responses.insert(url, body.as_bytes().to_vec());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn api() -> RangeInfoApi {
        RangeInfoApi::new("https://api.test/RangeInfo").unwrap()
    }

    #[test]
    fn test_range_info_urls() {
        let api = api();
        assert_eq!(api.county_url(), "https://api.test/RangeInfo/Country");
        assert_eq!(
            api.range_url("10", "2"),
            "https://api.test/RangeInfo/rangeFG?gid=10&fcid=2"
        );
        assert!(RangeInfoApi::new(DEFAULT_API_BASE)
            .unwrap()
            .county_url()
            .starts_with("https://service.taipower.com.tw/"));
    }

    #[tokio::test]
    async fn test_crawl_emits_sorted_village_rows() {
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(
                api.county_url(),
                r#"[{"name":"嘉義縣","gid":"C1","fcid":"1"}]"#,
            )
            .with(
                api.range_url("C1", "1"),
                r#"[{"info":"朴子市:F1:T1:2:0,空鄉:F9:T9:0:0,bad:entry"}]"#,
            )
            .with(
                api.range_url("T1", "F1"),
                r#"[{"info":"雙溪里:VF2:V2:3:0"},{"info":" 大鄉里 :VF1:V1:0:1"}]"#,
            );

        let crawler = HierarchyCrawler::new(&fetcher, api.clone());
        let harvest = crawler.crawl().await.unwrap();

        assert_eq!(
            harvest.rows,
            vec![
                HarvestRow {
                    county_name: "嘉義縣".to_string(),
                    town_name: "朴子市".to_string(),
                    cunli_name: "大鄉里".to_string(),
                    c0: 0,
                    c1: 1,
                    fcid: "VF1".to_string(),
                    gid: "V1".to_string(),
                },
                HarvestRow {
                    county_name: "嘉義縣".to_string(),
                    town_name: "朴子市".to_string(),
                    cunli_name: "雙溪里".to_string(),
                    c0: 3,
                    c1: 0,
                    fcid: "VF2".to_string(),
                    gid: "V2".to_string(),
                },
            ]
        );

        // The township with c0 = c1 = 0 is never fetched.
        assert_eq!(fetcher.requests().len(), 3);
        assert!(!fetcher.requests().contains(&api.range_url("T9", "F9")));
        assert_eq!(harvest.stats.expanded, 2);
        assert_eq!(harvest.stats.skipped_branches, 0);
    }

    #[tokio::test]
    async fn test_zero_counter_township_yields_nothing() {
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(api.county_url(), r#"[{"name":"A","gid":"C","fcid":"1"}]"#)
            .with(api.range_url("C", "1"), r#"[{"info":"A:F2:G2:0:0"}]"#);

        let harvest = HierarchyCrawler::new(&fetcher, api.clone())
            .crawl()
            .await
            .unwrap();

        assert!(harvest.rows.is_empty());
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_county_is_skipped() {
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(
                api.county_url(),
                r#"[{"name":"Gone","gid":"X","fcid":"0"},{"name":"Kept","gid":"K","fcid":"1"}]"#,
            )
            .with(api.range_url("K", "1"), r#"[{"info":"Town:TF:TG:1:0"}]"#)
            .with(api.range_url("TG", "TF"), r#"[{"info":"Vill:VF:VG:1:1"}]"#);

        let harvest = HierarchyCrawler::new(&fetcher, api.clone())
            .crawl()
            .await
            .unwrap();

        assert_eq!(harvest.rows.len(), 1);
        assert_eq!(harvest.rows[0].county_name, "Kept");
        assert_eq!(harvest.stats.skipped_branches, 1);
    }

    #[tokio::test]
    async fn test_unparseable_township_is_skipped_and_siblings_continue() {
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(api.county_url(), r#"[{"name":"C","gid":"C","fcid":"1"}]"#)
            .with(
                api.range_url("C", "1"),
                r#"[{"info":"Broken:BF:BG:1:0,Fine:OF:OG:0:5"}]"#,
            )
            .with(api.range_url("BG", "BF"), "<html>error</html>")
            .with(api.range_url("OG", "OF"), "[]");

        let harvest = HierarchyCrawler::new(&fetcher, api.clone())
            .crawl()
            .await
            .unwrap();

        assert!(harvest.rows.is_empty());
        assert_eq!(harvest.stats.skipped_branches, 1);
        assert_eq!(harvest.stats.expanded, 2);
        assert!(fetcher.requests().contains(&api.range_url("OG", "OF")));
    }

    #[tokio::test]
    async fn test_county_without_ids_does_not_stop_crawl() {
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(
                api.county_url(),
                r#"[{"name":"Good","gid":"K","fcid":"1"},{"name":"NoGid","fcid":"2"}]"#,
            )
            .with(api.range_url("K", "1"), r#"[{"info":"Town:TF:TG:1:0"}]"#)
            .with(api.range_url("TG", "TF"), r#"[{"info":"Vill:VF:VG:1:1"}]"#);

        let harvest = HierarchyCrawler::new(&fetcher, api.clone())
            .crawl()
            .await
            .unwrap();

        assert_eq!(harvest.stats.counties, 1);
        assert_eq!(harvest.rows.len(), 1);
        assert_eq!(harvest.rows[0].county_name, "Good");
    }

    #[tokio::test]
    async fn test_root_failure_is_fatal() {
        let api = api();
        let fetcher = FakeFetcher::default();
        let err = HierarchyCrawler::new(&fetcher, api).crawl().await.unwrap_err();
        assert!(matches!(err, PipelineError::RootFetch(_)));

        let api = RangeInfoApi::new("https://api.test/RangeInfo").unwrap();
        let fetcher = FakeFetcher::default().with(api.county_url(), "not json");
        let err = HierarchyCrawler::new(&fetcher, api).crawl().await.unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_snapshots_written_per_response() {
        let dir = tempfile::tempdir().unwrap();
        let api = api();
        let fetcher = FakeFetcher::default()
            .with(api.county_url(), r#"[{"name":"C","gid":"10","fcid":"1"}]"#)
            .with(api.range_url("10", "1"), r#"[{"info":"T:2:20:1:0"}]"#)
            .with(api.range_url("20", "2"), r#"[]"#);

        HierarchyCrawler::new(&fetcher, api)
            .with_snapshots(SnapshotStore::new(dir.path()))
            .crawl()
            .await
            .unwrap();

        assert!(dir.path().join("counties.json").exists());
        assert!(dir.path().join("towns_10_1.json").exists());
        assert!(dir.path().join("level_20_2.json").exists());
    }
}
