//! Table extraction over whole documents.

mod tabula;

pub use tabula::TabulaExtractor;

use std::path::Path;

use tracing::{debug, info};

use crate::error::ToolError;
use crate::models::statement::{ExtractionOptions, RawTable};

/// Trait for table extraction engines.
pub trait TableExtractor {
    /// Extract every table on every page of `document`.
    fn extract(&self, document: &Path, options: &ExtractionOptions)
    -> Result<Vec<RawTable>, ToolError>;
}

/// Run `extractor` and drop tables without rows.
///
/// An empty result is the "no data found" condition, not an error.
pub fn extract_tables(
    extractor: &dyn TableExtractor,
    document: &Path,
    options: &ExtractionOptions,
) -> Result<Vec<RawTable>, ToolError> {
    let tables = extractor.extract(document, options)?;
    let found = tables.len();

    let tables: Vec<RawTable> = tables.into_iter().filter(|t| !t.is_empty()).collect();
    debug!(
        "Extractor returned {} tables, {} with rows, from {}",
        found,
        tables.len(),
        document.display()
    );

    if tables.is_empty() {
        info!("No data found in {}", document.display());
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(Vec<RawTable>);

    impl TableExtractor for FixedExtractor {
        fn extract(&self, _: &Path, _: &ExtractionOptions) -> Result<Vec<RawTable>, ToolError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_empty_tables_are_dropped() {
        let row = vec![Some("a".to_string()), None];
        let extractor = FixedExtractor(vec![vec![], vec![row.clone()], vec![]]);

        let tables =
            extract_tables(&extractor, Path::new("x.pdf"), &ExtractionOptions::default()).unwrap();
        assert_eq!(tables, vec![vec![row]]);
    }

    #[test]
    fn test_no_tables() {
        let extractor = FixedExtractor(vec![vec![], vec![]]);
        let tables =
            extract_tables(&extractor, Path::new("x.pdf"), &ExtractionOptions::default()).unwrap();
        assert!(tables.is_empty());
    }
}
