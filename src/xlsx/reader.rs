//! XLSX workbook reader.
//!
//! Reads worksheet cells back into [`CellValue`] rows. It understands the
//! parts the writer produces plus the usual variations found in workbooks
//! saved by other tools (inline strings, sparse cells, absolute targets).

use crate::error::{Error, Result};
use crate::model::{CellValue, Dataset};
use quick_xml::events::Event;
use std::collections::HashMap;
use std::path::Path;

use super::cell_ref::{parse_cell_reference, MAX_ROWS};
use super::package::XlsxPackage;
use super::shared_strings::{decode_text, SharedStrings};

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Cells of one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    /// Sheet name
    pub name: String,
    /// Rows from row 1 down; gaps are filled with empty rows and cells
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    /// Treat row 1 as column names and the rest as data.
    pub fn into_dataset(self) -> Result<Dataset> {
        let mut rows = self.rows.into_iter();
        let columns: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| cell.to_string())
            .collect();
        let width = columns.len();

        let mut dataset = Dataset::new(columns);
        for mut row in rows {
            if row.len() > width {
                return Err(Error::InvalidData(format!(
                    "row has {} cells but the header has {}",
                    row.len(),
                    width
                )));
            }
            row.resize(width, CellValue::Empty);
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }
}

/// Reader for XLSX workbooks.
pub struct XlsxReader {
    package: XlsxPackage,
    shared_strings: SharedStrings,
    sheets: Vec<SheetInfo>,
    relationships: HashMap<String, String>,
}

impl XlsxReader {
    /// Open a workbook file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let package = XlsxPackage::open(path)?;
        Self::from_package(package)
    }

    /// Open a workbook held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let package = XlsxPackage::from_bytes(data)?;
        Self::from_package(package)
    }

    fn from_package(package: XlsxPackage) -> Result<Self> {
        let shared_strings = if let Ok(xml) = package.read_xml("xl/sharedStrings.xml") {
            SharedStrings::parse(&xml)?
        } else {
            SharedStrings::default()
        };

        let relationships = Self::parse_workbook_rels(&package)?;
        let sheets = Self::parse_workbook(&package)?;

        Ok(Self {
            package,
            shared_strings,
            sheets,
            relationships,
        })
    }

    /// Parse workbook relationships into id → target.
    fn parse_workbook_rels(package: &XlsxPackage) -> Result<HashMap<String, String>> {
        let mut rels = HashMap::new();
        let xml = match package.read_xml("xl/_rels/workbook.xml.rels") {
            Ok(xml) => xml,
            Err(_) => return Ok(rels),
        };

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if !id.is_empty() && !target.is_empty() {
                        rels.insert(id, target);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Parse workbook.xml for sheet names and relationship ids.
    fn parse_workbook(package: &XlsxPackage) -> Result<Vec<SheetInfo>> {
        let xml = package.read_xml("xl/workbook.xml")?;
        let mut sheets = Vec::new();

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = String::new();
                    let mut rel_id = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| {
                                        String::from_utf8_lossy(&attr.value).to_string()
                                    });
                            }
                            b"r:id" => rel_id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }
                    if !name.is_empty() {
                        sheets.push(SheetInfo { name, rel_id });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get the underlying package.
    pub fn package(&self) -> &XlsxPackage {
        &self.package
    }

    /// Read the cells of the sheet at `index`.
    pub fn read_sheet(&self, index: usize) -> Result<SheetData> {
        let sheet = self
            .sheets
            .get(index)
            .ok_or_else(|| Error::MissingComponent(format!("sheet #{}", index + 1)))?;
        let target = self
            .relationships
            .get(&sheet.rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("relationship {}", sheet.rel_id)))?;

        let sheet_path = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        };
        let xml = self.package.read_xml(&sheet_path)?;

        Ok(SheetData {
            name: sheet.name.clone(),
            rows: self.parse_sheet(&xml)?,
        })
    }

    /// Read the first sheet as a dataset, with row 1 as column names.
    pub fn read_dataset(&self) -> Result<Dataset> {
        self.read_sheet(0)?.into_dataset()
    }

    /// Parse worksheet XML into rows of cells.
    fn parse_sheet(&self, xml: &str) -> Result<Vec<Vec<CellValue>>> {
        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut in_value = false;
        let mut current_row: usize = 0;
        let mut next_col: usize = 0;
        let mut cell_col: usize = 0;
        let mut cell_type: Option<String> = None;
        let mut cell_text = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.name().as_ref() == b"row" => {
                    let explicit = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"r")
                        .and_then(|a| String::from_utf8_lossy(&a.value).parse::<usize>().ok());
                    current_row = explicit.unwrap_or(current_row + 1);
                    if current_row == 0 || current_row > MAX_ROWS as usize {
                        return Err(Error::InvalidData(format!(
                            "row number {} outside the worksheet",
                            current_row
                        )));
                    }
                    next_col = 0;
                    if rows.len() < current_row {
                        rows.resize(current_row, Vec::new());
                    }
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"c" => {
                    let (col, kind) = Self::cell_attributes(e, next_col);
                    cell_col = col;
                    cell_type = kind;
                    cell_text.clear();
                }
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"c" => {
                    let (col, _) = Self::cell_attributes(e, next_col);
                    next_col = col + 1;
                }
                Ok(Event::Start(ref e)) if matches!(e.name().as_ref(), b"v" | b"t") => {
                    in_value = true;
                }
                Ok(Event::Text(ref e)) if in_value => {
                    let text = e.unescape().unwrap_or_default();
                    cell_text.push_str(&text);
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"v" | b"t" => in_value = false,
                    b"c" => {
                        let value = self.resolve_cell_value(&cell_text, cell_type.as_deref());
                        if current_row > 0 {
                            let row = &mut rows[current_row - 1];
                            if row.len() <= cell_col {
                                row.resize(cell_col + 1, CellValue::Empty);
                            }
                            row[cell_col] = value;
                        }
                        next_col = cell_col + 1;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rows)
    }

    /// Column index and type attribute of a `<c>` element.
    fn cell_attributes(
        e: &quick_xml::events::BytesStart<'_>,
        fallback_col: usize,
    ) -> (usize, Option<String>) {
        let mut col = fallback_col;
        let mut kind = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let reference = String::from_utf8_lossy(&attr.value);
                    if let Some((_, c)) = parse_cell_reference(&reference) {
                        col = c;
                    }
                }
                b"t" => kind = Some(String::from_utf8_lossy(&attr.value).to_string()),
                _ => {}
            }
        }
        (col, kind)
    }

    /// Resolve a cell value based on its type.
    fn resolve_cell_value(&self, value: &str, cell_type: Option<&str>) -> CellValue {
        match cell_type {
            Some("s") => value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| self.shared_strings.get(idx))
                .map(CellValue::text)
                .unwrap_or(CellValue::Empty),
            Some("b") => CellValue::Bool(value.trim() == "1"),
            Some("e") | Some("str") | Some("inlineStr") => CellValue::text(decode_text(value)),
            _ => {
                if value.is_empty() {
                    CellValue::Empty
                } else {
                    value
                        .trim()
                        .parse::<f64>()
                        .map(CellValue::Number)
                        .unwrap_or_else(|_| CellValue::text(value))
                }
            }
        }
    }
}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("sheets", &self.sheet_names())
            .finish()
    }
}
