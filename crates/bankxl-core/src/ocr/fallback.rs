//! The single OCR retry of a statement.
//!
//! A statement starts in [`FallbackState::DirectAttempted`]. It moves to
//! [`FallbackState::OcrAttempted`] either before its first extraction (when
//! the workarounds require OCR) or after a first extraction that found no
//! tables. There is no way back and no second retry.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{ensure_readable_pdf, Decrypter, OcrService};
use crate::error::Result;
use crate::extract::{extract_tables, TableExtractor};
use crate::models::statement::{RawTable, Statement};

/// Where a statement is in the OCR retry state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    /// Extraction runs on the document as received.
    DirectAttempted,
    /// The document went through OCR; terminal.
    OcrAttempted,
}

impl FallbackState {
    pub fn of(statement: &Statement) -> Self {
        if statement.ocr_attempted() {
            FallbackState::OcrAttempted
        } else {
            FallbackState::DirectAttempted
        }
    }
}

/// Drives extraction of a statement, with at most one OCR retry.
pub struct OcrFallback<'a> {
    ocr: &'a dyn OcrService,
    decrypter: &'a dyn Decrypter,
    ocr_dir: PathBuf,
}

impl<'a> OcrFallback<'a> {
    /// Create a controller writing recognised documents to `ocr_dir`.
    pub fn new(
        ocr: &'a dyn OcrService,
        decrypter: &'a dyn Decrypter,
        ocr_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ocr,
            decrypter,
            ocr_dir: ocr_dir.into(),
        }
    }

    /// Extract the statement's tables, routing it through OCR when required
    /// up front or when the direct attempt finds nothing.
    ///
    /// The extractor runs at most twice. An empty result after OCR is
    /// returned as is.
    pub fn extract(
        &self,
        extractor: &dyn TableExtractor,
        statement: &mut Statement,
    ) -> Result<Vec<RawTable>> {
        if statement.flags().requires_ocr {
            debug!("{} requires OCR before extraction", statement.source_name());
            self.transition(statement)?;
        }

        let tables = extract_tables(extractor, &statement.source_path(), statement.options())?;
        if !tables.is_empty() || FallbackState::of(statement) == FallbackState::OcrAttempted {
            return Ok(tables);
        }

        info!("No data found in {}, trying OCR", statement.source_name());
        self.transition(statement)?;
        Ok(extract_tables(extractor, &statement.source_path(), statement.options())?)
    }

    /// Move the statement to the OCR state: decrypt, recognise, swap options,
    /// drop the original and continue from the OCR directory.
    ///
    /// Does nothing if OCR was already attempted.
    pub fn transition(&self, statement: &mut Statement) -> Result<()> {
        if FallbackState::of(statement) == FallbackState::OcrAttempted {
            return Ok(());
        }

        let source = statement.source_path();
        let target = self.ocr_dir.join(statement.source_name());

        self.decrypter.decrypt_in_place(&source)?;

        fs::create_dir_all(&self.ocr_dir)?;
        info!("Running OCR on {} -> {}", source.display(), target.display());
        let recognized = self
            .ocr
            .recognize(&source, &target)
            .and_then(|()| ensure_readable_pdf("ocr", &target));
        if let Err(e) = recognized {
            discard(&target);
            return Err(e.into());
        }

        fs::remove_file(&source)?;
        statement.switch_to_ocr(&self.ocr_dir);
        Ok(())
    }
}

/// Remove a partial or unusable OCR output.
fn discard(target: &Path) {
    if target.exists() {
        if let Err(e) = fs::remove_file(target) {
            warn!("Could not remove {}: {}", target.display(), e);
        }
    }
}
