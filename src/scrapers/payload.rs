//! JSON payload shapes returned by the RangeInfo endpoints.

use serde_json::Value;
use tracing::warn;

use super::packed::decode_info;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{PackedInfoEntry, Region, RegionLevel};
use crate::utils::json_text;

/// Name used when a county record carries no name.
const UNKNOWN_COUNTY: &str = "Unknown";

/// Top-level items of a payload: array elements, object values, or nothing
/// for `null`. Any other scalar is not a list payload.
fn payload_items(value: &Value) -> Result<Vec<&Value>, serde_json::Error> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => Ok(map.values().collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a list of records, got {}",
            other
        ))),
    }
}

fn county_from_record(record: &Value) -> Option<Region> {
    let gid = record.get("gid").and_then(json_text)?;
    let fcid = record.get("fcid").and_then(json_text)?;
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_COUNTY);
    Some(Region::new(name, gid, fcid, RegionLevel::County))
}

/// Parse the root county list.
///
/// Only a body that is not JSON, or not a list, is an error. Counties whose
/// `gid` or `fcid` cannot be read are logged and skipped.
pub fn parse_counties(body: &[u8]) -> PipelineResult<Vec<Region>> {
    let parse_error = |source| PipelineError::Parse {
        what: "county list".to_string(),
        source,
    };
    let value: Value = serde_json::from_slice(body).map_err(parse_error)?;
    let records = payload_items(&value).map_err(parse_error)?;

    let mut counties = Vec::with_capacity(records.len());
    for record in records {
        match county_from_record(record) {
            Some(county) => counties.push(county),
            None => warn!("Skipping county record without usable ids: {}", record),
        }
    }
    Ok(counties)
}

/// Parse a range payload and decode every packed `info` field in it.
///
/// Objects without a string `info` field are skipped. An empty payload
/// (`[]`, `{}` or `null`) yields no entries.
pub fn parse_range(body: &[u8]) -> Result<Vec<PackedInfoEntry>, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;

    Ok(payload_items(&value)?
        .into_iter()
        .filter_map(|group| group.get("info").and_then(Value::as_str))
        .flat_map(decode_info)
        .collect())
}
