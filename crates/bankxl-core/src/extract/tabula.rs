//! Table extraction through the tabula-java command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::TableExtractor;
use crate::error::ToolError;
use crate::models::statement::{ExtractionOptions, RawTable};
use crate::tool::ToolRunner;

/// Extracts tables by running `java -jar tabula.jar -f JSON`.
pub struct TabulaExtractor {
    java: ToolRunner,
    jar: PathBuf,
}

/// One table as emitted by tabula's JSON writer.
#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

impl TabulaExtractor {
    /// Create an extractor using the given java executable and tabula jar.
    pub fn new(java: impl AsRef<Path>, jar: impl Into<PathBuf>) -> Self {
        Self {
            java: ToolRunner::new(java),
            jar: jar.into(),
        }
    }

    fn build_args(&self, document: &Path, options: &ExtractionOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-Dfile.encoding=UTF8".into(),
            "-jar".into(),
            self.jar.clone().into(),
            "--pages".into(),
            "all".into(),
            "--format".into(),
            "JSON".into(),
        ];

        match options.crop_region {
            Some(region) => {
                let area = region
                    .as_area()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                args.push("--area".into());
                args.push(area.into());
            }
            None => args.push("--guess".into()),
        }

        if options.lattice == Some(true) {
            args.push("--lattice".into());
        }
        if options.stream == Some(true) {
            args.push("--stream".into());
        }

        args.push(document.as_os_str().to_os_string());
        args
    }
}

impl TableExtractor for TabulaExtractor {
    fn extract(
        &self,
        document: &Path,
        options: &ExtractionOptions,
    ) -> Result<Vec<RawTable>, ToolError> {
        let output = self.java.run(self.build_args(document, options))?;
        parse_tabula_json(&output.stdout).map_err(|reason| ToolError::UnreadableOutput {
            tool: "tabula".to_string(),
            reason,
        })
    }
}

/// Convert tabula JSON into raw tables.
///
/// Empty cell text counts as missing, and short rows are padded with missing
/// cells up to the widest row of their table.
fn parse_tabula_json(json: &[u8]) -> Result<Vec<RawTable>, String> {
    let text = std::str::from_utf8(json).map_err(|e| e.to_string())?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tables: Vec<TabulaTable> = serde_json::from_str(text).map_err(|e| e.to_string())?;

    Ok(tables
        .into_iter()
        .map(|table| {
            let width = table.data.iter().map(Vec::len).max().unwrap_or(0);
            table
                .data
                .into_iter()
                .map(|row| {
                    let mut cells: Vec<Option<String>> = row
                        .into_iter()
                        .map(|cell| Some(cell.text).filter(|t| !t.is_empty()))
                        .collect();
                    cells.resize(width, None);
                    cells
                })
                .collect()
        })
        .collect())
}
