//! Administrative region models produced by the hierarchy crawl.

use serde::{Deserialize, Serialize};

/// Level of a node in the county → township → village hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLevel {
    County,
    Township,
    Village,
}

impl RegionLevel {
    /// Number of levels in the hierarchy. Traversal never descends past it.
    pub const MAX_DEPTH: usize = 3;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::County => "county",
            Self::Township => "township",
            Self::Village => "village",
        }
    }

    /// One-based depth of this level (county = 1).
    pub fn depth(&self) -> usize {
        match self {
            Self::County => 1,
            Self::Township => 2,
            Self::Village => 3,
        }
    }

    /// Level of the children listed in this level's range payload.
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::County => Some(Self::Township),
            Self::Township => Some(Self::Village),
            Self::Village => None,
        }
    }

    /// Leaves are emitted as rows instead of being expanded.
    pub fn is_leaf(&self) -> bool {
        self.depth() >= Self::MAX_DEPTH
    }

    /// Filename prefix for the raw snapshot written when a node at this
    /// level is expanded.
    pub fn snapshot_prefix(&self) -> &'static str {
        match self {
            Self::County => "towns",
            Self::Township | Self::Village => "level",
        }
    }
}

/// One node of the administrative hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub gid: String,
    pub fcid: String,
    pub level: RegionLevel,
}

impl Region {
    pub fn new(
        name: impl AsRef<str>,
        gid: impl Into<String>,
        fcid: impl Into<String>,
        level: RegionLevel,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            gid: gid.into(),
            fcid: fcid.into(),
            level,
        }
    }
}

/// A decoded `name:fcid:gid:c0:c1` unit of a packed `info` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedInfoEntry {
    pub name: String,
    pub fcid: String,
    pub gid: String,
    pub c0: i64,
    pub c1: i64,
}

impl PackedInfoEntry {
    /// Entries with a positive counter have children worth fetching.
    pub fn has_children(&self) -> bool {
        self.c0 > 0 || self.c1 > 0
    }

    /// Promote this entry to a region node at the given level.
    pub fn to_region(&self, level: RegionLevel) -> Region {
        Region::new(&self.name, self.gid.clone(), self.fcid.clone(), level)
    }
}

/// A village record in the harvested table.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRow {
    pub county_name: String,
    pub town_name: String,
    pub cunli_name: String,
    pub c0: i64,
    pub c1: i64,
    pub fcid: String,
    pub gid: String,
}

impl HarvestRow {
    pub const HEADER: [&'static str; 7] = [
        "county_name",
        "town_name",
        "cunli_name",
        "c0",
        "c1",
        "fcid",
        "gid",
    ];

    /// Build a row for a village entry under the given county and township.
    pub fn from_entry(county: &str, town: &str, entry: &PackedInfoEntry) -> Self {
        Self {
            county_name: county.to_string(),
            town_name: town.to_string(),
            cunli_name: entry.name.clone(),
            c0: entry.c0,
            c1: entry.c1,
            fcid: entry.fcid.clone(),
            gid: entry.gid.clone(),
        }
    }
}
