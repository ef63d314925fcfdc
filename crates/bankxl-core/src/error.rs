//! Error types for the bankxl-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for converting a single statement.
#[derive(Error, Debug)]
pub enum BankxlError {
    /// The filename could not be classified.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An external tool (extractor, OCR, decryption) failed.
    #[error("external tool failure: {0}")]
    Tool(#[from] ToolError),

    /// Spreadsheet persistence error.
    #[error("spreadsheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Moving files into the outcome directory failed.
    #[error("relocation failed: {0}")]
    Relocation(#[from] RelocationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`BankxlError`], used to decide what happens to
/// the statement and to the batch exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Statement is skipped entirely.
    Parse,
    /// Statement is marked failed, batch continues.
    ExternalTool,
    /// Data consistency is at risk; surfaced to the operator.
    Io,
}

impl BankxlError {
    /// Map this error onto the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankxlError::Parse(_) => ErrorKind::Parse,
            BankxlError::Tool(_) => ErrorKind::ExternalTool,
            BankxlError::Sheet(_)
            | BankxlError::Relocation(_)
            | BankxlError::Io(_)
            | BankxlError::Config(_) => ErrorKind::Io,
        }
    }
}

/// Errors raised while classifying a filename.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The filename does not start with a four digit year.
    #[error("no leading 4-digit year in filename: {0}")]
    MissingYear(String),
}

/// Errors from invoking external tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be started at all.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{tool} failed (exit {code}): {stderr}")]
    Failed {
        tool: String,
        code: i32,
        stderr: String,
    },

    /// The tool succeeded but its output could not be used.
    #[error("unreadable output from {tool}: {reason}")]
    UnreadableOutput { tool: String, reason: String },
}

/// Errors related to spreadsheet persistence.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Failed to write the workbook archive.
    #[error("failed to write workbook: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to read the workbook back.
    #[error("failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    /// Failed to parse workbook XML.
    #[error("malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The expected worksheet is not present.
    #[error("worksheet not found: {0}")]
    MissingSheet(String),

    /// I/O error while writing the workbook.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A relocation that could not be completed.
#[derive(Error, Debug)]
#[error("moving {} to {}: {source}{}", from.display(), to.display(), rollback_note(stranded.as_deref()))]
pub struct RelocationError {
    /// File being moved when the failure happened.
    pub from: PathBuf,
    /// Intended destination.
    pub to: PathBuf,
    /// Whether both files of the statement are still in their original directory.
    pub rolled_back: bool,
    /// Where an already moved output was left when it could not be put back.
    pub stranded: Option<PathBuf>,
    #[source]
    pub source: std::io::Error,
}

fn rollback_note(stranded: Option<&std::path::Path>) -> String {
    match stranded {
        Some(path) => format!(" (output stranded at {})", path.display()),
        None => " (files left in place)".to_string(),
    }
}

/// Result type for the bankxl library.
pub type Result<T> = std::result::Result<T, BankxlError>;
