//! Core library for converting bank statement PDFs into spreadsheets.
//!
//! This crate provides:
//! - Filename classification (bank, office, year) and per-bank workarounds
//! - Table extraction through tabula, with an OCR retry path via ocrmypdf
//! - Table cleanup and date repair
//! - XLSX output with fitted column widths
//! - Size based classification and relocation of finished statements

pub mod error;
pub mod models;
pub mod statement;
pub mod tool;
pub mod extract;
pub mod ocr;
pub mod table;
pub mod sheet;
pub mod output;
pub mod pipeline;

pub use error::{BankxlError, ErrorKind, Result};
pub use models::config::{BankxlConfig, DecrypterKind};
pub use models::statement::{Bank, ExtractionOptions, Office, Statement, WorkaroundFlags};
pub use extract::{TableExtractor, TabulaExtractor};
pub use ocr::{Decrypter, LopdfDecrypter, OcrFallback, OcrMyPdf, OcrService, QpdfDecrypter};
pub use sheet::{SpreadsheetWriter, WriteSummary};
pub use output::{OutputClassifier, Outcome};
pub use pipeline::{Converter, ConverterBuilder, StatementReport};
