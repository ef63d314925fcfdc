//! Removing encryption from statement PDFs.

use std::ffi::OsStr;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::Decrypter;
use crate::error::ToolError;
use crate::tool::ToolRunner;

/// qpdf exits with 3 when it succeeded but printed warnings.
const QPDF_EXIT_WARNINGS: i32 = 3;

/// Runs `qpdf --decrypt --replace-input <document>`.
pub struct QpdfDecrypter {
    runner: ToolRunner,
}

impl QpdfDecrypter {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            runner: ToolRunner::new(program).accept_exit_code(QPDF_EXIT_WARNINGS),
        }
    }
}

impl Decrypter for QpdfDecrypter {
    fn decrypt_in_place(&self, document: &Path) -> Result<(), ToolError> {
        self.runner
            .run([OsStr::new("--decrypt"), OsStr::new("--replace-input"), document.as_os_str()])?;
        Ok(())
    }
}

/// Decrypts documents protected with an empty user password, in process.
#[derive(Debug, Default)]
pub struct LopdfDecrypter;

impl LopdfDecrypter {
    pub fn new() -> Self {
        Self
    }
}

impl Decrypter for LopdfDecrypter {
    fn decrypt_in_place(&self, document: &Path) -> Result<(), ToolError> {
        let unreadable = |reason: String| ToolError::UnreadableOutput {
            tool: "lopdf".to_string(),
            reason,
        };

        let mut doc = Document::load(document)
            .map_err(|e| unreadable(format!("{}: {}", document.display(), e)))?;

        if !doc.is_encrypted() {
            debug!("{} is not encrypted", document.display());
            return Ok(());
        }

        doc.decrypt("")
            .map_err(|e| unreadable(format!("cannot decrypt {}: {}", document.display(), e)))?;
        doc.trailer.remove(b"Encrypt");

        doc.save(document).map_err(|e| ToolError::Failed {
            tool: "lopdf".to_string(),
            code: -1,
            stderr: e.to_string(),
        })?;
        debug!("Decrypted {} with empty password", document.display());
        Ok(())
    }
}
