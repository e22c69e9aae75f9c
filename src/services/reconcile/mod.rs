//! Reconciliation of harvested villages against the reference dataset.
//!
//! The lookup is built from the reference index with the manual overrides
//! merged on top, then every harvested row is resolved by exact
//! [`LookupKey`]. Rows that resolve become [`MappedRow`]s; the rest are
//! reported. No well-formed row is dropped silently, so
//! `matched + unmatched == processed` always holds.

mod overrides;
mod reference;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::PipelineResult;
use crate::models::{HarvestRow, LookupKey, MappedRow};
use crate::storage::read_harvest_file;

pub use overrides::{
    load_overrides, parse_overrides, ManualOverride, OverrideTable, DEFAULT_OVERRIDES_PATH,
};
pub use reference::{load_reference, parse_reference, ReferenceIndex};

/// Emit a progress line every this many processed rows.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Merged `LookupKey → VILLCODE` table.
#[derive(Debug, Clone, Default)]
pub struct VillageLookup {
    codes: HashMap<LookupKey, String>,
    reference_entries: usize,
    reference_skipped: usize,
    overrides: usize,
    overrides_replaced: usize,
}

impl VillageLookup {
    pub fn new(reference: ReferenceIndex) -> Self {
        Self {
            codes: reference.codes,
            reference_entries: reference.entries,
            reference_skipped: reference.skipped,
            ..Default::default()
        }
    }

    /// Merge overrides on top of the reference codes; overrides win.
    ///
    /// An override that replaces a different reference code is logged so the
    /// data owners can confirm the reference entry really is wrong.
    pub fn apply_overrides(&mut self, table: &OverrideTable) {
        for entry in &table.overrides {
            let key = entry.key();
            if let Some(previous) = self.codes.insert(key.clone(), entry.villcode.clone()) {
                if previous != entry.villcode {
                    warn!(
                        "Override for {} replaces reference code {} with {}",
                        key.readable(),
                        previous,
                        entry.villcode
                    );
                    self.overrides_replaced += 1;
                }
            }
        }
        self.overrides += table.len();
    }

    pub fn resolve(&self, key: &LookupKey) -> Option<&str> {
        self.codes.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Summary of one reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Harvest records skipped for having too few columns.
    pub malformed: usize,
    pub reference_entries: usize,
    pub reference_skipped: usize,
    pub overrides: usize,
    pub overrides_replaced: usize,
    /// Distinct unmatched keys in first-seen order.
    pub unmatched_keys: Vec<LookupKey>,
}

impl ReconcileReport {
    pub fn is_balanced(&self) -> bool {
        self.matched + self.unmatched == self.processed
    }
}

/// Mapped rows sorted by `VILLCODE` plus the run report.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub rows: Vec<MappedRow>,
    pub report: ReconcileReport,
}

/// Resolve every harvested row against `lookup`.
pub fn reconcile(lookup: &VillageLookup, rows: &[HarvestRow]) -> Reconciliation {
    let mut report = ReconcileReport {
        reference_entries: lookup.reference_entries,
        reference_skipped: lookup.reference_skipped,
        overrides: lookup.overrides,
        overrides_replaced: lookup.overrides_replaced,
        ..Default::default()
    };
    let mut mapped = Vec::new();
    let mut seen_unmatched = HashSet::new();

    for row in rows {
        report.processed += 1;

        let key = LookupKey::new(&row.county_name, &row.town_name, &row.cunli_name);
        match lookup.resolve(&key) {
            Some(code) => {
                mapped.push(MappedRow {
                    vill_code: code.to_string(),
                    c0: row.c0,
                    c1: row.c1,
                });
                report.matched += 1;
            }
            None => {
                info!("  Unmatched: {}", key.readable());
                report.unmatched += 1;
                if seen_unmatched.insert(key.clone()) {
                    report.unmatched_keys.push(key);
                }
            }
        }

        if report.processed % PROGRESS_INTERVAL == 0 {
            info!("  Processed: {} records", report.processed);
        }
    }

    mapped.sort_by(|a, b| a.vill_code.cmp(&b.vill_code));

    Reconciliation {
        rows: mapped,
        report,
    }
}

/// Input files of a reconcile run.
#[derive(Debug, Clone)]
pub struct ReconcileInputs {
    pub reference: PathBuf,
    pub overrides: PathBuf,
    pub harvest: PathBuf,
}

/// Load every input, then reconcile.
///
/// All inputs are read before anything is matched, so a missing or broken
/// file aborts the run before the caller writes any output.
pub fn reconcile_files(inputs: &ReconcileInputs) -> PipelineResult<Reconciliation> {
    info!("Loading reference data from {}", inputs.reference.display());
    let reference = load_reference(&inputs.reference)?;
    info!(
        "Found {} village records in reference data ({} skipped)",
        reference.codes.len(),
        reference.skipped
    );

    let overrides = load_overrides(&inputs.overrides)?;
    let mut lookup = VillageLookup::new(reference);
    lookup.apply_overrides(&overrides);
    info!(
        "Added {} manual mappings (version {})",
        overrides.len(),
        overrides.version.as_deref().unwrap_or("unversioned")
    );

    info!("Loading harvested villages from {}", inputs.harvest.display());
    let table = read_harvest_file(&inputs.harvest)?;

    let mut result = reconcile(&lookup, &table.rows);
    result.report.malformed = table.malformed;
    Ok(result)
}
