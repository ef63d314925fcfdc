//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::BankxlError;

/// Main configuration for the bankxl pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BankxlConfig {
    /// Directory layout for a batch.
    pub layout: LayoutConfig,

    /// External tool locations.
    pub tools: ToolConfig,

    /// Spreadsheet output and classification settings.
    pub output: OutputConfig,
}

/// Names of the directories a batch works with, relative to the batch root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Extension (without dot) of source documents to pick up.
    pub extension: String,

    /// Destination for statements whose output looks populated.
    pub processed_dir: PathBuf,

    /// Destination for statements whose output looks empty.
    pub failed_dir: PathBuf,

    /// Where OCR'd documents are written before extraction resumes.
    pub ocr_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
            processed_dir: PathBuf::from("processed"),
            failed_dir: PathBuf::from("failed"),
            ocr_dir: PathBuf::from("ocr"),
        }
    }
}

/// Which implementation strips document encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecrypterKind {
    /// `qpdf --decrypt --replace-input`.
    Qpdf,
    /// In-process empty-password decryption.
    Native,
}

/// External tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Java executable used to run tabula.
    pub java: PathBuf,

    /// Path to the tabula-java jar.
    pub tabula_jar: PathBuf,

    /// ocrmypdf executable.
    pub ocrmypdf: PathBuf,

    /// qpdf executable.
    pub qpdf: PathBuf,

    /// Decryption backend.
    pub decrypter: DecrypterKind,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            tabula_jar: PathBuf::from("tabula.jar"),
            ocrmypdf: PathBuf::from("ocrmypdf"),
            qpdf: PathBuf::from("qpdf"),
            decrypter: DecrypterKind::Qpdf,
        }
    }
}

/// Spreadsheet output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Outputs strictly larger than this many bytes count as processed.
    pub min_processed_bytes: u64,

    /// Multiplier applied to the longest value in a column.
    pub width_factor: f64,

    /// Name of the single worksheet.
    pub sheet_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_processed_bytes: 5_500, // Tuned against real populated statements
            width_factor: 1.1,
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl BankxlConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), BankxlError> {
        if self.layout.extension.is_empty() {
            return Err(BankxlError::Config("layout.extension is empty".to_string()));
        }
        if !self.output.width_factor.is_finite() || self.output.width_factor <= 0.0 {
            return Err(BankxlError::Config(format!(
                "output.width_factor must be positive, got {}",
                self.output.width_factor
            )));
        }
        // Excel rejects longer sheet names
        let name_len = self.output.sheet_name.chars().count();
        if name_len == 0 || name_len > 31 {
            return Err(BankxlError::Config(format!(
                "output.sheet_name must be 1-31 characters, got {:?}",
                self.output.sheet_name
            )));
        }
        Ok(())
    }
}
