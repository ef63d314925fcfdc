//! Optical recognition, decryption and the OCR retry path.

mod decrypt;
mod fallback;
mod ocrmypdf;

pub use decrypt::{LopdfDecrypter, QpdfDecrypter};
pub use fallback::{FallbackState, OcrFallback};
pub use ocrmypdf::OcrMyPdf;

use std::path::Path;

use crate::error::ToolError;

/// Trait for services that add a text layer to a document.
pub trait OcrService {
    /// Recognise `input` and write the result to `output`.
    ///
    /// Recognition must happen even when `input` already has a text layer.
    fn recognize(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Trait for removing password protection from a document.
pub trait Decrypter {
    /// Decrypt `document` in place. Unencrypted documents are left as they are.
    fn decrypt_in_place(&self, document: &Path) -> Result<(), ToolError>;
}

/// Check that `path` holds a PDF that can be parsed.
pub(crate) fn ensure_readable_pdf(tool: &str, path: &Path) -> Result<(), ToolError> {
    let document = lopdf::Document::load(path).map_err(|e| ToolError::UnreadableOutput {
        tool: tool.to_string(),
        reason: format!("{}: {}", path.display(), e),
    })?;

    if document.get_pages().is_empty() {
        return Err(ToolError::UnreadableOutput {
            tool: tool.to_string(),
            reason: format!("{} has no pages", path.display()),
        });
    }
    Ok(())
}
