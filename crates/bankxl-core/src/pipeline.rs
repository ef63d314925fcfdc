//! End-to-end conversion of one statement.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::error::{BankxlError, Result};
use crate::extract::{TableExtractor, TabulaExtractor};
use crate::models::config::{BankxlConfig, DecrypterKind};
use crate::models::statement::{Bank, Office, Statement};
use crate::ocr::{Decrypter, LopdfDecrypter, OcrFallback, OcrMyPdf, OcrService, QpdfDecrypter};
use crate::output::{OutputClassifier, Outcome};
use crate::sheet::{SpreadsheetWriter, WriteSummary};
use crate::table::assemble;

/// What happened to one statement.
#[derive(Debug, Clone, Serialize)]
pub struct StatementReport {
    /// Source filename.
    pub source_name: String,
    pub bank: Bank,
    pub office: Office,
    pub year: u16,
    /// Whether the document went through OCR.
    pub ocr_attempted: bool,
    /// Bucket the statement ended up in.
    pub outcome: Outcome,
    /// Tables written.
    pub tables: usize,
    /// Rows written.
    pub rows: usize,
    /// Size of the spreadsheet output in bytes.
    pub output_bytes: u64,
    /// Directory holding the source and output now.
    pub location: PathBuf,
    /// External tool failure that forced the `failed` outcome, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Converts statements found in a batch directory.
pub struct Converter {
    extractor: Box<dyn TableExtractor>,
    ocr: Box<dyn OcrService>,
    decrypter: Box<dyn Decrypter>,
    config: BankxlConfig,
}

/// Builder for [`Converter`].
///
/// Collaborators not set explicitly are created from the tool configuration.
#[derive(Default)]
pub struct ConverterBuilder {
    extractor: Option<Box<dyn TableExtractor>>,
    ocr: Option<Box<dyn OcrService>>,
    decrypter: Option<Box<dyn Decrypter>>,
    config: BankxlConfig,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table extractor.
    pub fn with_extractor(mut self, extractor: impl TableExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Set the OCR service.
    pub fn with_ocr(mut self, ocr: impl OcrService + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    /// Set the decryption backend.
    pub fn with_decrypter(mut self, decrypter: impl Decrypter + 'static) -> Self {
        self.decrypter = Some(Box::new(decrypter));
        self
    }

    /// Set configuration.
    pub fn with_config(mut self, config: BankxlConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the converter. Fails if the configuration is invalid.
    pub fn build(self) -> Result<Converter> {
        self.config.validate()?;
        let tools = &self.config.tools;

        let extractor = self
            .extractor
            .unwrap_or_else(|| Box::new(TabulaExtractor::new(&tools.java, tools.tabula_jar.clone())));
        let ocr = self
            .ocr
            .unwrap_or_else(|| Box::new(OcrMyPdf::new(&tools.ocrmypdf)));
        let decrypter = self.decrypter.unwrap_or_else(|| match tools.decrypter {
            DecrypterKind::Qpdf => Box::new(QpdfDecrypter::new(&tools.qpdf)),
            DecrypterKind::Native => Box::new(LopdfDecrypter::new()),
        });

        Ok(Converter {
            extractor,
            ocr,
            decrypter,
            config: self.config,
        })
    }
}

impl Converter {
    /// Create a new builder.
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    /// Convert the statement `source_name` located directly in `root`.
    ///
    /// External tool failures are absorbed: the statement gets an empty
    /// output and is moved to the failed directory. Filename, spreadsheet and
    /// relocation errors are returned.
    pub fn convert(&self, root: &Path, source_name: &str) -> Result<StatementReport> {
        let start = Instant::now();
        let mut statement = Statement::new(source_name, root)?;
        info!(
            "Processing {} (bank {}, office {}, year {})",
            source_name,
            statement.bank(),
            statement.office(),
            statement.year()
        );

        let writer = SpreadsheetWriter::from_config(&self.config.output);
        let classifier = OutputClassifier::from_config(&self.config, root);
        let fallback = OcrFallback::new(
            self.ocr.as_ref(),
            self.decrypter.as_ref(),
            root.join(&self.config.layout.ocr_dir),
        );

        let (written, tool_error) = match fallback.extract(self.extractor.as_ref(), &mut statement)
        {
            Ok(raw) => {
                let tables = assemble(raw, &statement);
                (writer.write(&tables, &statement.output_path())?, None)
            }
            Err(BankxlError::Tool(e)) => {
                error!("{}: {}", source_name, e);
                writer.write(&[], &statement.output_path())?;
                (WriteSummary::default(), Some(e.to_string()))
            }
            Err(e) => return Err(e),
        };

        let (outcome, output_bytes) = if tool_error.is_some() {
            classifier.relocate(&mut statement, Outcome::Failed)?;
            (Outcome::Failed, 0)
        } else {
            classifier.finish(&mut statement)?
        };

        Ok(StatementReport {
            source_name: source_name.to_string(),
            bank: statement.bank(),
            office: statement.office(),
            year: statement.year(),
            ocr_attempted: statement.ocr_attempted(),
            outcome,
            tables: written.tables,
            rows: written.rows,
            output_bytes,
            location: statement.working_dir().to_path_buf(),
            error: tool_error,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ToolError};
    use crate::models::statement::{ExtractionOptions, RawTable, NBC_CROP_REGION};
    use crate::sheet::xlsx;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    struct CopyOcr;

    impl OcrService for CopyOcr {
        fn recognize(&self, input: &Path, output: &Path) -> std::result::Result<(), ToolError> {
            fs::copy(input, output).map_err(|source| ToolError::Spawn {
                tool: "copy".to_string(),
                source,
            })?;
            Ok(())
        }
    }

    struct NoopDecrypter;

    impl Decrypter for NoopDecrypter {
        fn decrypt_in_place(&self, _: &Path) -> std::result::Result<(), ToolError> {
            Ok(())
        }
    }

    /// Produces `tables` on every call and counts calls.
    struct FixedExtractor {
        tables: Vec<RawTable>,
        calls: Rc<Cell<usize>>,
    }

    impl TableExtractor for FixedExtractor {
        fn extract(
            &self,
            _: &Path,
            _: &ExtractionOptions,
        ) -> std::result::Result<Vec<RawTable>, ToolError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.tables.clone())
        }
    }

    struct BrokenExtractor;

    impl TableExtractor for BrokenExtractor {
        fn extract(
            &self,
            _: &Path,
            _: &ExtractionOptions,
        ) -> std::result::Result<Vec<RawTable>, ToolError> {
            Err(ToolError::Failed {
                tool: "java".to_string(),
                code: 1,
                stderr: "Unable to access jarfile".to_string(),
            })
        }
    }

    fn write_pdf(dir: &Path, name: &str) {
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(dir.join(name)).unwrap();
    }

    fn transactions(rows: usize) -> RawTable {
        (0..rows)
            .map(|i| {
                vec![
                    Some(format!("REF{:05}", i)),
                    Some(format!("{:02}/03/2", (i % 28) + 1)),
                    Some(format!("Payment to supplier number {} for services rendered", i)),
                    Some(format!("{:02}/03/2 value", (i % 28) + 1)),
                    None,
                    Some(format!("{}.00", i * 1000)),
                ]
            })
            .collect()
    }

    fn converter(extractor: impl TableExtractor + 'static) -> Converter {
        Converter::builder()
            .with_extractor(extractor)
            .with_ocr(CopyOcr)
            .with_decrypter(NoopDecrypter)
            .build()
            .unwrap()
    }

    #[test]
    fn test_nbc_statement_with_no_tables_fails() {
        let dir = tempfile::tempdir().unwrap();
        let name = "2022-04 Mbeya NBC Statement.pdf";
        write_pdf(dir.path(), name);

        let statement = Statement::new(name, dir.path()).unwrap();
        assert!(statement.flags().requires_ocr);
        assert!(statement.flags().repair_dates);
        assert_eq!(statement.options().crop_region, Some(NBC_CROP_REGION));

        let calls = Rc::new(Cell::new(0));
        let converter = converter(FixedExtractor {
            tables: Vec::new(),
            calls: calls.clone(),
        });

        let report = converter.convert(dir.path(), name).unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        assert!(report.ocr_attempted);
        assert_eq!(report.output_bytes, 0);
        assert_eq!(calls.get(), 1);

        let failed = dir.path().join("failed");
        assert_eq!(report.location, failed);
        assert!(failed.join(name).exists());
        let output = failed.join("2022-04 Mbeya NBC Statement.xlsx");
        assert_eq!(fs::metadata(&output).unwrap().len(), 0);
        assert!(!dir.path().join("ocr").join(name).exists());
    }

    #[test]
    fn test_populated_statement_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        let name = "2021-07 Mbeya NBC Statement.pdf";
        write_pdf(dir.path(), name);

        let calls = Rc::new(Cell::new(0));
        let converter = converter(FixedExtractor {
            tables: vec![transactions(120), transactions(30)],
            calls: calls.clone(),
        });

        let report = converter.convert(dir.path(), name).unwrap();

        assert_eq!(report.outcome, Outcome::Processed);
        assert_eq!(report.tables, 2);
        assert_eq!(report.rows, 150);
        assert!(report.output_bytes > 5_500);

        let output = dir.path().join("processed/2021-07 Mbeya NBC Statement.xlsx");
        let grid = xlsx::read_sheet(&output, "Sheet1").unwrap();
        assert_eq!(grid.len(), 150);
        assert_eq!(grid[0][1], "01/03/22021");
        assert_eq!(grid[0][3], "01/03/22021");
        assert_eq!(grid[0][4], "");
        // Second table is not date-repaired.
        assert_eq!(grid[120][1], "01/03/2");
    }

    #[test]
    fn test_tool_failure_marks_statement_failed() {
        let dir = tempfile::tempdir().unwrap();
        let name = "2016-08 Dar CRDB TAS.pdf";
        write_pdf(dir.path(), name);

        let report = converter(BrokenExtractor).convert(dir.path(), name).unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        assert!(report.error.as_deref().unwrap().contains("Unable to access jarfile"));
        assert!(dir.path().join("failed").join(name).exists());
        assert!(dir.path().join("failed/2016-08 Dar CRDB TAS.xlsx").exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = BankxlConfig::default();
        config.output.sheet_name = String::new();

        let err = Converter::builder().with_config(config).build().err().unwrap();
        assert!(matches!(err, BankxlError::Config(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_unparseable_name_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_pdf(dir.path(), "statement.pdf");

        let calls = Rc::new(Cell::new(0));
        let converter = converter(FixedExtractor {
            tables: Vec::new(),
            calls: calls.clone(),
        });

        let err = converter.convert(dir.path(), "statement.pdf").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(calls.get(), 0);
        assert!(dir.path().join("statement.pdf").exists());
    }
}
