//! Map command: reconcile the harvested table against the reference dataset.

use anyhow::Context;

use cunli::config::Settings;
use cunli::services::{reconcile_files, ReconcileInputs};
use cunli::storage::write_mapped_file;

use crate::cli::helpers::print_mapping_summary;

/// Resolve harvested villages to VILLCODEs and write `docs/taipower.csv`.
///
/// With `json`, the summary is printed as a JSON document instead of text.
pub fn cmd_map(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let inputs = ReconcileInputs {
        reference: settings.reference.clone(),
        overrides: settings.overrides.clone(),
        harvest: settings.harvest_path(),
    };
    let result = reconcile_files(&inputs).context("Mapping failed")?;

    let output = settings.mapped_path();
    write_mapped_file(&output, &result.rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
    } else {
        print_mapping_summary(&result.report, &output);
    }
    Ok(())
}
