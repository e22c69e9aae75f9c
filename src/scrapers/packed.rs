//! Decoder for the packed `info` field of RangeInfo payloads.
//!
//! The field holds several child records in one string:
//! `name:fcid:gid:c0:c1[,name:fcid:gid:c0:c1...]`. Fields past the fifth are
//! ignored and entries with fewer than five fields are dropped.

use tracing::debug;

use crate::models::PackedInfoEntry;
use crate::utils::coerce_int;

const ENTRY_SEPARATOR: char = ',';
const FIELD_SEPARATOR: char = ':';
const MIN_FIELDS: usize = 5;

/// Decode every well-formed entry of a packed `info` string.
pub fn decode_info(info: &str) -> Vec<PackedInfoEntry> {
    info.split(ENTRY_SEPARATOR)
        .filter_map(|raw| {
            let entry = decode_entry(raw);
            if entry.is_none() {
                debug!("Discarding malformed info entry {:?}", raw);
            }
            entry
        })
        .collect()
}

/// Decode a single `name:fcid:gid:c0:c1` entry.
pub fn decode_entry(raw: &str) -> Option<PackedInfoEntry> {
    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    Some(PackedInfoEntry {
        name: fields[0].trim().to_string(),
        fcid: fields[1].to_string(),
        gid: fields[2].to_string(),
        c0: coerce_int(fields[3]),
        c1: coerce_int(fields[4]),
    })
}
