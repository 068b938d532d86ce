//! Spreadsheet ingestion for uploaded question guides.

use calamine::{Reader, open_workbook_auto};
use std::path::Path;
use voxpop_core::error::{Result, VoxError};

/// Reads the first column of the first sheet as raw strings.
///
/// Supports the formats `calamine` auto-detects (xlsx, xls, ods). No
/// filtering happens here; blank and junk rows are dropped by the
/// question filter downstream.
pub fn read_first_column(path: &Path) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| VoxError::io(format!("cannot open {}: {err}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| VoxError::config(format!("{} has no sheets", path.display())))?
        .map_err(|err| VoxError::io(format!("cannot read {}: {err}", path.display())))?;

    let rows: Vec<String> = range
        .rows()
        .filter_map(|row| row.first())
        .map(|cell| cell.to_string())
        .collect();

    tracing::debug!(
        target: "spreadsheet",
        path = %path.display(),
        rows = rows.len(),
        "first column read"
    );
    Ok(rows)
}
