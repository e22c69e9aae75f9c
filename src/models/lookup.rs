//! Reference-side models used by the reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact-match join key: `county|town|village` with each part trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(String);

impl LookupKey {
    pub const SEPARATOR: char = '|';

    pub fn new(county: &str, town: &str, village: &str) -> Self {
        Self(format!(
            "{}{sep}{}{sep}{}",
            county.trim(),
            town.trim(),
            village.trim(),
            sep = Self::SEPARATOR
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form, e.g. `嘉義縣 > 朴子市 > 雙溪里`.
    pub fn readable(&self) -> String {
        self.0.replace(Self::SEPARATOR, " > ")
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical village record from the reference dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub county_name: String,
    pub town_name: String,
    pub vill_name: String,
    pub vill_code: String,
}

impl ReferenceEntry {
    pub fn key(&self) -> LookupKey {
        LookupKey::new(&self.county_name, &self.town_name, &self.vill_name)
    }
}

/// A matched row in the mapped table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRow {
    #[serde(rename = "VILLCODE")]
    pub vill_code: String,
    pub c0: i64,
    pub c1: i64,
}

impl MappedRow {
    pub const HEADER: [&'static str; 3] = ["VILLCODE", "c0", "c1"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_trims_each_part() {
        let key = LookupKey::new(" 臺南市", "鹽水區 ", " 頭港里 ");
        assert_eq!(key.as_str(), "臺南市|鹽水區|頭港里");
        assert_eq!(key.readable(), "臺南市 > 鹽水區 > 頭港里");
    }

    #[test]
    fn test_reference_entry_key_matches_harvest_key() {
        let entry = ReferenceEntry {
            county_name: "嘉義市".to_string(),
            town_name: "西區".to_string(),
            vill_name: "磚瑤里".to_string(),
            vill_code: "10020020018".to_string(),
        };
        assert_eq!(entry.key(), LookupKey::new("嘉義市", "西區", "磚瑤里"));
    }
}
