//! Minimal single-sheet XLSX persistence.
//!
//! Workbooks are written as a zip of SpreadsheetML parts with all text in the
//! shared string table, and read back through calamine.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::SheetError;
use crate::models::statement::Row;

const SHEET_PART: &str = "xl/worksheets/sheet1.xml";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    r#"</Types>"#,
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"</Relationships>"#,
);

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Write `rows` as the only sheet of a new workbook at `path`, replacing any
/// existing file. `widths[i]` sets the width of column `i`.
pub fn write_sheet(
    path: &Path,
    sheet_name: &str,
    rows: &[Row],
    widths: &[f64],
) -> Result<(), SheetError> {
    let mut strings = SharedStrings::default();
    let sheet_xml = sheet_xml(rows, widths, &mut strings);

    let workbook_xml = format!(
        concat!(
            "{}",
            r#"<workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        XML_HEADER,
        MAIN_NS,
        escape(sheet_name),
    );

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        (SHEET_PART, sheet_xml),
        ("xl/sharedStrings.xml", strings.to_xml()),
    ];

    let mut zip = ZipWriter::new(File::create(path)?);
    for (name, body) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()?;
    Ok(())
}

/// Read every row of `sheet_name`.
///
/// Cells are returned at their absolute positions; rows keep their written
/// length (trailing never-written cells are not padded in).
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<Vec<Row>, SheetError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(SheetError::MissingSheet(sheet_name.to_string()));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let Some((start_row, start_col)) = range.start() else {
        return Ok(Vec::new());
    };

    let mut rows: Vec<Row> = Vec::new();
    for (r, c, value) in range.cells() {
        if matches!(value, Data::Empty) {
            continue;
        }
        let (r, c) = (start_row as usize + r, start_col as usize + c);
        if rows.len() <= r {
            rows.resize(r + 1, Vec::new());
        }
        let row = &mut rows[r];
        if row.len() <= c {
            row.resize(c + 1, String::new());
        }
        row[c] = match value {
            Data::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    Ok(rows)
}

/// Write `rows` into the sheet at `path` starting at `start_row`.
///
/// Existing cells outside the written area are kept; the file is rewritten
/// without column widths.
pub fn overlay_rows(
    path: &Path,
    sheet_name: &str,
    start_row: usize,
    rows: &[Row],
) -> Result<(), SheetError> {
    let mut grid = read_sheet(path, sheet_name)?;
    place_rows(&mut grid, start_row, rows);
    write_sheet(path, sheet_name, &grid, &[])
}

/// Column widths stored in the workbook at `path`, in column order.
pub fn read_column_widths(path: &Path) -> Result<Vec<f64>, SheetError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name(SHEET_PART)?.read_to_string(&mut xml)?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut widths = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"col" => {
                let width = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref() == b"width")
                    .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok());
                if let Some(width) = width {
                    widths.push(width);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(widths)
}

/// Overlay `rows` onto `grid` starting at `start_row`, growing it as needed.
pub(crate) fn place_rows(grid: &mut Vec<Row>, start_row: usize, rows: &[Row]) {
    if grid.len() < start_row + rows.len() {
        grid.resize(start_row + rows.len(), Vec::new());
    }
    for (offset, row) in rows.iter().enumerate() {
        let target = &mut grid[start_row + offset];
        if target.len() < row.len() {
            target.resize(row.len(), String::new());
        }
        for (col, value) in row.iter().enumerate() {
            target[col].clone_from(value);
        }
    }
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    values: Vec<String>,
    count: usize,
}

impl SharedStrings {
    fn add(&mut self, value: &str) -> usize {
        self.count += 1;
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.values.len();
        self.index.insert(value.to_string(), idx);
        self.values.push(value.to_string());
        idx
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"{}<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            XML_HEADER,
            MAIN_NS,
            self.count,
            self.values.len()
        );
        for value in &self.values {
            xml.push_str(r#"<si><t xml:space="preserve">"#);
            xml.push_str(&escape(xml_safe(value).as_str()));
            xml.push_str("</t></si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

fn sheet_xml(rows: &[Row], widths: &[f64], strings: &mut SharedStrings) -> String {
    let mut xml = format!(r#"{}<worksheet xmlns="{}">"#, XML_HEADER, MAIN_NS);

    if !widths.is_empty() {
        xml.push_str("<cols>");
        for (idx, width) in widths.iter().enumerate() {
            xml.push_str(&format!(
                r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                n = idx + 1,
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (r, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c r="{}{}" t="s"><v>{}</v></c>"#,
                column_name(c),
                r + 1,
                strings.add(value)
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 26 -> AA).
pub(crate) fn column_name(mut idx: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Drop characters XML 1.0 cannot carry.
fn xml_safe(value: &str) -> String {
    value
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
