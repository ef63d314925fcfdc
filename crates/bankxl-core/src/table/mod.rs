//! Cleaning extracted tables before they are written.

mod repair;

pub use repair::{repair_date, repair_date_columns, DATE_COLUMNS};

use tracing::debug;

use crate::models::statement::{RawTable, Statement, Table};

/// Turn raw extractor output into writable tables.
///
/// Missing cells become empty strings and carriage returns become spaces.
/// When the statement needs date repair, columns 1 and 3 of the first table
/// get the statement year re-attached.
pub fn assemble(tables: Vec<RawTable>, statement: &Statement) -> Vec<Table> {
    let mut tables: Vec<Table> = tables.into_iter().map(clean_table).collect();

    if statement.flags().repair_dates {
        if let Some(first) = tables.first_mut() {
            debug!(
                "Repairing dates in {} with year {}",
                statement.source_name(),
                statement.year()
            );
            repair_date_columns(first, statement.year());
        }
    }

    tables
}

/// Fill missing cells and replace carriage returns.
pub fn clean_table(table: RawTable) -> Table {
    table
        .into_iter()
        .map(|row| row.into_iter().map(clean_cell).collect())
        .collect()
}

fn clean_cell(cell: Option<String>) -> String {
    match cell {
        Some(text) if text.contains('\r') => text.replace('\r', " "),
        Some(text) => text,
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(rows: &[&[Option<&str>]]) -> RawTable {
        rows.iter()
            .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
            .collect()
    }

    #[test]
    fn test_clean_table() {
        let table = raw(&[
            &[Some("Opening\rbalance"), None, Some("100")],
            &[None, Some("a\r\nb"), Some("\r")],
        ]);

        assert_eq!(
            clean_table(table),
            vec![
                vec!["Opening balance", "", "100"],
                vec!["", "a \nb", " "],
            ]
        );
    }

    #[test]
    fn test_assemble_repairs_first_table_only() {
        let statement = Statement::new("2023-01 Mbeya NBC.pdf", ".").unwrap();
        assert!(statement.flags().repair_dates);

        let first = raw(&[&[
            Some("01/02/3"),
            Some("01/02/3"),
            Some("01/02/3"),
            Some("04/05/6 x"),
        ]]);
        let second = raw(&[&[Some("01/02/3"), Some("01/02/3")]]);

        let tables = assemble(vec![first, second], &statement);
        assert_eq!(
            tables,
            vec![
                vec![vec!["01/02/3", "01/02/32023", "01/02/3", "04/05/62023"]],
                vec![vec!["01/02/3", "01/02/3"]],
            ]
        );
    }

    #[test]
    fn test_assemble_without_repair() {
        let statement = Statement::new("2023-01 Dodoma NBC.pdf", ".").unwrap();
        assert!(!statement.flags().repair_dates);

        let tables = assemble(
            vec![raw(&[&[Some("a"), Some("01/02/3"), None]])],
            &statement,
        );
        assert_eq!(tables, vec![vec![vec!["a", "01/02/3", ""]]]);
    }

    #[test]
    fn test_assemble_empty() {
        let statement = Statement::new("2023-01 Mbeya NBC.pdf", ".").unwrap();
        assert!(assemble(Vec::new(), &statement).is_empty());
    }
}
