//! Loader for the TopoJSON village reference dataset.
//!
//! Only `objects.<name>.geometries[].properties` is read; geometry arcs are
//! ignored. Entries missing any of `COUNTYNAME`, `TOWNNAME`, `VILLNAME` or
//! `VILLCODE` are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{LookupKey, ReferenceEntry};
use crate::utils::json_text;

const COUNTY_PROP: &str = "COUNTYNAME";
const TOWN_PROP: &str = "TOWNNAME";
const VILLAGE_PROP: &str = "VILLNAME";
const CODE_PROP: &str = "VILLCODE";

/// Reference lookup keyed by [`LookupKey`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    pub codes: HashMap<LookupKey, String>,
    /// Geometries that carried all four properties.
    pub entries: usize,
    /// Geometries dropped for a missing or empty property.
    pub skipped: usize,
}

impl ReferenceIndex {
    /// Index entries by key; the last entry for a duplicate key wins.
    pub fn from_entries(entries: impl IntoIterator<Item = ReferenceEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.entries += 1;
            index.codes.insert(entry.key(), entry.vill_code);
        }
        index
    }
}

fn prop(props: &Map<String, Value>, name: &str) -> Option<String> {
    props
        .get(name)
        .and_then(json_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn entry_from_properties(props: &Map<String, Value>) -> Option<ReferenceEntry> {
    Some(ReferenceEntry {
        county_name: prop(props, COUNTY_PROP)?,
        town_name: prop(props, TOWN_PROP)?,
        vill_name: prop(props, VILLAGE_PROP)?,
        vill_code: prop(props, CODE_PROP)?,
    })
}

/// Parse a TopoJSON document into a reference index.
pub fn parse_reference(body: &[u8]) -> PipelineResult<ReferenceIndex> {
    let root: Value = serde_json::from_slice(body).map_err(|source| PipelineError::Parse {
        what: "reference dataset".to_string(),
        source,
    })?;

    let mut entries = Vec::new();
    let mut skipped = 0;

    let objects = root.get("objects").and_then(Value::as_object);
    for (name, object) in objects.into_iter().flatten() {
        let Some(geometries) = object.get("geometries").and_then(Value::as_array) else {
            debug!("Reference object {} has no geometries", name);
            continue;
        };

        for geometry in geometries {
            let Some(props) = geometry.get("properties").and_then(Value::as_object) else {
                skipped += 1;
                continue;
            };
            match entry_from_properties(props) {
                Some(entry) => entries.push(entry),
                None => {
                    debug!("Skipping reference geometry with incomplete properties: {:?}", props);
                    skipped += 1;
                }
            }
        }
    }

    let mut index = ReferenceIndex::from_entries(entries);
    index.skipped = skipped;
    Ok(index)
}

/// Load the reference dataset from disk. A missing or unparseable file is
/// fatal.
pub fn load_reference(path: &Path) -> PipelineResult<ReferenceIndex> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    parse_reference(&fs::read(path)?)
}
