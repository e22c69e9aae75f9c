//! Raw response snapshots kept as an audit trail of each crawl.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};
use url::form_urlencoded;

/// Writes every fetched payload to a directory before it is parsed.
///
/// Snapshots are never read back by the pipeline, so a failed write is
/// logged and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    dir: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A store that discards everything.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Snapshot filename for an expanded node: `<prefix>_<gid>_<fcid>.json`.
    pub fn node_filename(prefix: &str, gid: &str, fcid: &str) -> String {
        format!("{}_{}_{}.json", prefix, encode_id(gid), encode_id(fcid))
    }

    /// Save a payload under `name`. Returns the written path.
    pub fn save(&self, name: &str, body: &[u8]) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let path = dir.join(name);
        match fs::create_dir_all(dir).and_then(|_| fs::write(&path, body)) {
            Ok(()) => {
                debug!("Saved {} bytes to {}", body.len(), path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Failed to write snapshot {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Percent-encode an opaque id. `_` is encoded as well, so distinct
/// `(gid, fcid)` pairs always give distinct filenames.
fn encode_id(id: &str) -> String {
    form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('_', "%5F")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_node_filename() {
        assert_eq!(
            SnapshotStore::node_filename("towns", "10010", "3"),
            "towns_10010_3.json"
        );
        assert_eq!(
            SnapshotStore::node_filename("level", "a/b", "c d"),
            "level_a%2Fb_c+d.json"
        );
    }

    #[test]
    fn test_distinct_ids_never_share_a_filename() {
        let names = [
            SnapshotStore::node_filename("level", "a/b", "1"),
            SnapshotStore::node_filename("level", "a_b", "1"),
            SnapshotStore::node_filename("level", "a", "b_1"),
            SnapshotStore::node_filename("level", "a b", "1"),
            SnapshotStore::node_filename("level", "a+b", "1"),
        ];
        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| !n.contains('/')));
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("raw"));
        let path = store.save("counties.json", b"[]").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"[]");
    }

    #[test]
    fn test_disabled_store_writes_nothing() {
        assert!(SnapshotStore::disabled().save("counties.json", b"[]").is_none());
    }
}
