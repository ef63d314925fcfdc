//! Date-digit repair for statements whose dates lose their last digits.
//!
//! A cell starting with `DD/DD/D` is rewritten to that prefix followed by the
//! full statement year. Whatever followed the prefix is dropped.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::statement::Table;

lazy_static! {
    static ref TRUNCATED_DATE: Regex = Regex::new(r"^\d{2}/\d{2}/\d").unwrap();
}

/// Columns holding transaction and value dates.
pub const DATE_COLUMNS: [usize; 2] = [1, 3];

/// Repair a single cell. Non-matching cells come back unchanged.
pub fn repair_date(cell: &str, year: u16) -> String {
    match TRUNCATED_DATE.find(cell) {
        Some(prefix) => format!("{}{}", prefix.as_str(), year),
        None => cell.to_string(),
    }
}

/// Repair [`DATE_COLUMNS`] of every row. Rows too short for a column are skipped.
pub fn repair_date_columns(table: &mut Table, year: u16) {
    for row in table.iter_mut() {
        for &col in DATE_COLUMNS.iter() {
            if let Some(cell) = row.get_mut(col) {
                *cell = repair_date(cell, year);
            }
        }
    }
}
