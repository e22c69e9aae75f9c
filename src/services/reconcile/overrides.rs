//! Manual override table for villages whose harvested names do not match the
//! reference dataset (renamed, reclassified or spelled with variant
//! characters).
//!
//! The table lives in a versioned TOML asset:
//!
//! ```toml
//! version = "2024-08-07"
//!
//! [[override]]
//! county = "嘉義縣"
//! town = "朴子市"
//! village = "雙溪里"
//! villcode = "10010020012"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::models::LookupKey;

/// Default location of the override asset, relative to the working directory.
pub const DEFAULT_OVERRIDES_PATH: &str = "data/manual_overrides.toml";

/// One `(county, town, village) → VILLCODE` override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverride {
    pub county: String,
    pub town: String,
    pub village: String,
    pub villcode: String,
}

impl ManualOverride {
    pub fn key(&self) -> LookupKey {
        LookupKey::new(&self.county, &self.town, &self.village)
    }
}

#[derive(Debug, Default, Deserialize)]
struct OverrideFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "override")]
    overrides: Vec<ManualOverride>,
}

/// Parsed override table.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    pub version: Option<String>,
    pub overrides: Vec<ManualOverride>,
}

impl OverrideTable {
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Parse override TOML. Every field of every entry must be non-empty.
pub fn parse_overrides(text: &str, path: &Path) -> PipelineResult<OverrideTable> {
    let file: OverrideFile = toml::from_str(text).map_err(|e| PipelineError::Overrides {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    for (index, entry) in file.overrides.iter().enumerate() {
        let fields = [&entry.county, &entry.town, &entry.village, &entry.villcode];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(PipelineError::Overrides {
                path: path.to_path_buf(),
                message: format!("entry {} has an empty field: {:?}", index + 1, entry),
            });
        }
    }

    Ok(OverrideTable {
        version: file.version,
        overrides: file.overrides,
    })
}

/// Load the override asset. A missing or invalid file is fatal.
pub fn load_overrides(path: &Path) -> PipelineResult<OverrideTable> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    parse_overrides(&fs::read_to_string(path)?, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let text = r#"
version = "2024-08-07"

[[override]]
county = "嘉義縣"
town = "朴子市"
village = "雙溪里"
villcode = "10010020012"

[[override]]
county = "彰化縣"
town = "芳苑鄉"
village = "頂部村"
villcode = "10007230013"
"#;
        let table = parse_overrides(text, Path::new("overrides.toml")).unwrap();
        assert_eq!(table.version.as_deref(), Some("2024-08-07"));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.overrides[0].key(),
            LookupKey::new("嘉義縣", "朴子市", "雙溪里")
        );
    }

    #[test]
    fn test_empty_file_is_an_empty_table() {
        let table = parse_overrides("", Path::new("overrides.toml")).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.version, None);
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let text = r#"
[[override]]
county = "嘉義縣"
town = "朴子市"
village = "雙溪里"
villcode = " "
"#;
        assert!(matches!(
            parse_overrides(text, Path::new("overrides.toml")),
            Err(PipelineError::Overrides { .. })
        ));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let text = "[[override]]\ncounty = \"嘉義縣\"\n";
        assert!(parse_overrides(text, Path::new("overrides.toml")).is_err());
    }

    #[test]
    fn test_shipped_asset_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_OVERRIDES_PATH);
        let table = load_overrides(&path).unwrap();
        assert_eq!(table.len(), 28);
        assert!(table
            .overrides
            .iter()
            .any(|o| o.key() == LookupKey::new("嘉義縣", "朴子市", "雙溪里")
                && o.villcode == "10010020012"));
    }
}
