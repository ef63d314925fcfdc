//! Writing statement tables to a spreadsheet.

pub mod xlsx;

use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::error::SheetError;
use crate::models::config::OutputConfig;
use crate::models::statement::{Row, Table};

/// What a write produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of tables written.
    pub tables: usize,
    /// Total rows written across all tables.
    pub rows: usize,
}

/// Writes a statement's tables into a single worksheet.
#[derive(Debug, Clone)]
pub struct SpreadsheetWriter {
    sheet_name: String,
    width_factor: f64,
}

impl SpreadsheetWriter {
    /// Create a writer for the named sheet.
    pub fn new(sheet_name: impl Into<String>, width_factor: f64) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            width_factor,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.sheet_name.clone(), config.width_factor)
    }

    /// Write `tables` one below the other into `path`, then fit column widths.
    ///
    /// With no tables a zero-byte placeholder is created instead, so every
    /// statement leaves an output file behind.
    pub fn write(&self, tables: &[Table], path: &Path) -> Result<WriteSummary, SheetError> {
        if tables.is_empty() {
            info!("No tables, creating empty placeholder {}", path.display());
            File::create(path)?;
            return Ok(WriteSummary::default());
        }

        let mut rows = 0;
        for (idx, table) in tables.iter().enumerate() {
            if idx == 0 {
                debug!("New file, writing {} rows to {}", table.len(), path.display());
                xlsx::write_sheet(path, &self.sheet_name, table, &[])?;
            } else {
                debug!("Existing file, adding {} rows from row {}", table.len(), rows);
                xlsx::overlay_rows(path, &self.sheet_name, rows, table)?;
            }
            rows += table.len();
        }

        self.fit_columns(path)?;
        info!("Saved {} ({} tables, {} rows)", path.display(), tables.len(), rows);

        Ok(WriteSummary {
            tables: tables.len(),
            rows,
        })
    }

    /// Reopen the workbook and rewrite it with widths fitted to its content.
    pub fn fit_columns(&self, path: &Path) -> Result<(), SheetError> {
        let grid = xlsx::read_sheet(path, &self.sheet_name)?;
        let widths = column_widths(&grid, self.width_factor);
        xlsx::write_sheet(path, &self.sheet_name, &grid, &widths)
    }
}

/// Width of each column: `factor` times the longer of its longest value and
/// its position label.
pub fn column_widths(grid: &[Row], factor: f64) -> Vec<f64> {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);

    (0..columns)
        .map(|col| {
            let longest_value = grid
                .iter()
                .filter_map(|row| row.get(col))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0);
            let label = col.to_string().len();
            longest_value.max(label) as f64 * factor
        })
        .collect()
}
