//! Statement data model.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::statement::{classify_filename, configure};

/// Bank that issued a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    Nbc,
    Crdb,
    Unknown,
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bank::Nbc => "NBC",
            Bank::Crdb => "CRDB",
            Bank::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Regional office a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Office {
    Dar,
    Dodoma,
    Musoma,
    Mbeya,
    Katavi,
    Unknown,
}

impl fmt::Display for Office {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Office::Dar => "Dar",
            Office::Dodoma => "Dodoma",
            Office::Musoma => "Musoma",
            Office::Mbeya => "Mbeya",
            Office::Katavi => "Katavi",
            Office::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Page area searched for tables, in PDF points.
///
/// Field order matches the extractor's `--area` argument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl CropRegion {
    /// Values in extractor order (top, left, bottom, right).
    pub fn as_area(&self) -> [f64; 4] {
        [self.top, self.left, self.bottom, self.right]
    }
}

/// Transaction-table area of NBC statements; also used for every OCR'd document.
pub const NBC_CROP_REGION: CropRegion = CropRegion {
    top: 153.0,
    left: 30.0,
    bottom: 840.525,
    right: 564.99,
};

/// Parameters handed to the table extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Restrict the search to this area; `None` means the whole page.
    pub crop_region: Option<CropRegion>,

    /// Ruled-line detection toggle; `None` leaves the extractor default.
    pub lattice: Option<bool>,

    /// Whitespace detection toggle; `None` leaves the extractor default.
    pub stream: Option<bool>,
}

impl ExtractionOptions {
    /// Options used for every extraction after OCR.
    pub fn after_ocr() -> Self {
        Self {
            crop_region: Some(NBC_CROP_REGION),
            lattice: Some(false),
            stream: Some(true),
        }
    }
}

/// Control flags derived from bank and office.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkaroundFlags {
    /// Route the document through OCR before the first extraction.
    pub requires_ocr: bool,

    /// Re-attach the year to dates truncated by the extractor.
    pub repair_dates: bool,
}

/// A table straight from the extractor; `None` marks a missing cell.
pub type RawTable = Vec<Vec<Option<String>>>;

/// A row of cleaned cell text.
pub type Row = Vec<String>;

/// A cleaned table ready to be written.
pub type Table = Vec<Row>;

/// One source document and the state derived from it.
#[derive(Debug, Clone)]
pub struct Statement {
    source_name: String,
    bank: Bank,
    office: Office,
    year: u16,
    options: ExtractionOptions,
    flags: WorkaroundFlags,
    ocr_attempted: bool,
    working_dir: PathBuf,
    output_name: String,
}

impl Statement {
    /// Classify `source_name` and derive its configuration.
    ///
    /// `working_dir` is the directory the document currently lives in.
    pub fn new(source_name: &str, working_dir: impl Into<PathBuf>) -> Result<Self, ParseError> {
        let (bank, office, year) = classify_filename(source_name)?;
        let (options, flags) = configure(bank, office);

        Ok(Self {
            source_name: source_name.to_string(),
            bank,
            office,
            year,
            options,
            flags,
            ocr_attempted: false,
            working_dir: working_dir.into(),
            output_name: output_name_for(source_name),
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn office(&self) -> Office {
        self.office
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    pub fn flags(&self) -> WorkaroundFlags {
        self.flags
    }

    pub fn ocr_attempted(&self) -> bool {
        self.ocr_attempted
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Current path of the source document.
    pub fn source_path(&self) -> PathBuf {
        self.working_dir.join(&self.source_name)
    }

    /// Current path of the spreadsheet output.
    pub fn output_path(&self) -> PathBuf {
        self.working_dir.join(&self.output_name)
    }

    /// Record the one permitted OCR retry: new options, new location.
    ///
    /// Returns `false` (and changes nothing) if OCR was already attempted.
    pub(crate) fn switch_to_ocr(&mut self, ocr_dir: &Path) -> bool {
        if self.ocr_attempted {
            return false;
        }
        self.options = ExtractionOptions::after_ocr();
        self.working_dir = ocr_dir.to_path_buf();
        self.ocr_attempted = true;
        true
    }

    pub(crate) fn relocate_to(&mut self, dir: &Path) {
        self.working_dir = dir.to_path_buf();
    }
}

fn output_name_for(source_name: &str) -> String {
    Path::new(source_name)
        .with_extension("xlsx")
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_statement() {
        let statement = Statement::new("2022-04 Mbeya NBC Statement.pdf", ".").unwrap();

        assert_eq!(statement.bank(), Bank::Nbc);
        assert_eq!(statement.office(), Office::Mbeya);
        assert_eq!(statement.year(), 2022);
        assert_eq!(statement.output_name(), "2022-04 Mbeya NBC Statement.xlsx");
        assert_eq!(statement.source_path(), PathBuf::from("./2022-04 Mbeya NBC Statement.pdf"));
        assert!(!statement.ocr_attempted());
    }

    #[test]
    fn test_new_statement_without_year() {
        let err = Statement::new("Mbeya NBC.pdf", ".").unwrap_err();
        assert_eq!(err, ParseError::MissingYear("Mbeya NBC.pdf".to_string()));
    }

    #[test]
    fn test_switch_to_ocr_only_once() {
        let mut statement = Statement::new("2016-08 Dar CRDB TAS.pdf", ".").unwrap();
        assert_eq!(statement.options().lattice, Some(false));

        assert!(statement.switch_to_ocr(Path::new("ocr")));
        assert_eq!(*statement.options(), ExtractionOptions::after_ocr());
        assert_eq!(statement.working_dir(), Path::new("ocr"));

        assert!(!statement.switch_to_ocr(Path::new("elsewhere")));
        assert_eq!(statement.working_dir(), Path::new("ocr"));
    }

    #[test]
    fn test_crop_region_area_order() {
        assert_eq!(NBC_CROP_REGION.as_area(), [153.0, 30.0, 840.525, 564.99]);
    }
}
