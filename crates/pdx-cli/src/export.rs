//! CSV export of protein records.
//!
//! Flattens records into RFC4180-style CSV with a fixed column list. Fields
//! containing commas, quotes, or newlines are quoted with embedded quotes
//! doubled; the `csv` writer handles this quoting.

use chrono::Utc;
use pdx_common::types::ProteinRecord;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CliError, Result};

/// Column order of the export, matching the detail view.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "id",
    "accession",
    "name",
    "organism",
    "domains",
    "length",
    "sequence",
];

/// Timestamped default filename, e.g. `proteins-20260829-143000.csv`.
pub fn default_filename() -> PathBuf {
    PathBuf::from(format!(
        "proteins-{}.csv",
        Utc::now().format("%Y%m%d-%H%M%S")
    ))
}

/// Render records as CSV text with the fixed column list.
pub fn to_csv(records: &[ProteinRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| CliError::export(e.to_string()))?;

    for record in records {
        writer
            .write_record([
                record.id.to_string(),
                record.accession.clone(),
                record.name.clone(),
                record.organism.clone(),
                record.domains.clone().unwrap_or_default(),
                record.length.to_string(),
                record.sequence.clone(),
            ])
            .map_err(|e| CliError::export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CliError::export(e.to_string()))
}

/// Write records to `path`, or to a timestamped file in the working
/// directory when no path is given. Returns the path written.
pub fn write_csv(records: &[ProteinRecord], path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_filename);
    let csv = to_csv(records)?;
    std::fs::write(&path, csv)?;
    info!(path = %path.display(), rows = records.len(), "Exported CSV");
    Ok(path)
}
