//! OCR through the `ocrmypdf` command line.

use std::ffi::OsStr;
use std::path::Path;

use super::OcrService;
use crate::error::ToolError;
use crate::tool::ToolRunner;

/// Runs `ocrmypdf --force-ocr <input> <output>`.
pub struct OcrMyPdf {
    runner: ToolRunner,
}

impl OcrMyPdf {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            runner: ToolRunner::new(program),
        }
    }
}

impl OcrService for OcrMyPdf {
    fn recognize(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.runner
            .run([input.as_os_str(), output.as_os_str(), OsStr::new("--force-ocr")])?;
        Ok(())
    }
}
