//! XLSX workbook writer.

use crate::error::{Error, Result};
use crate::model::{CellValue, Dataset};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

use super::cell_ref::cell_reference;
use super::shared_strings::SharedStrings;
use super::{NS_MAIN, NS_REL};

/// Characters Excel rejects in sheet names.
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Maximum sheet name length accepted by Excel.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Style index of header cells in `styles.xml`.
const HEADER_STYLE: &str = "1";

/// Write `dataset` to `path` as a single-sheet workbook, replacing any existing file.
pub fn write_xlsx(dataset: &Dataset, path: impl AsRef<Path>, sheet_name: &str) -> Result<()> {
    let bytes = to_xlsx_bytes(dataset, sheet_name)?;
    fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Serialize `dataset` as a single-sheet workbook.
///
/// Row 1 holds the column names; data follows from row 2. No index column
/// is written.
pub fn to_xlsx_bytes(dataset: &Dataset, sheet_name: &str) -> Result<Vec<u8>> {
    validate_sheet_name(sheet_name)?;

    let mut strings = SharedStrings::new();
    let sheet = worksheet_xml(dataset, &mut strings)?;
    let shared = strings.to_xml()?;
    let workbook = workbook_xml(sheet_name)?;

    let parts: [(&str, &[u8]); 9] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("docProps/app.xml", APP_XML.as_bytes()),
        ("docProps/core.xml", CORE_XML.as_bytes()),
        ("xl/workbook.xml", &workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/sharedStrings.xml", &shared),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidData(format!(
            "sheet name must be 1-{} characters: {:?}",
            MAX_SHEET_NAME_LEN, name
        )));
    }
    if name.contains(INVALID_SHEET_CHARS)
        || name.contains(char::is_control)
        || name.starts_with('\'')
        || name.ends_with('\'')
    {
        return Err(Error::InvalidData(format!("invalid sheet name: {:?}", name)));
    }
    Ok(())
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    let mut writer = quick_xml::Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("workbook").with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_REL)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    writer.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", sheet_name),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner())
}

fn worksheet_xml(dataset: &Dataset, strings: &mut SharedStrings) -> Result<Vec<u8>> {
    let mut writer = quick_xml::Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_REL)]),
    ))?;

    let last_row = dataset.row_count() as u32 + 1;
    let dimension = match dataset.column_count() {
        0 => "A1".to_string(),
        n => format!("A1:{}", cell_reference(n - 1, last_row)),
    };
    writer.write_event(Event::Empty(
        BytesStart::new("dimension").with_attributes([("ref", dimension.as_str())]),
    ))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    if dataset.column_count() > 0 {
        start_row(&mut writer, 1)?;
        for (col, name) in dataset.columns().iter().enumerate() {
            let reference = cell_reference(col, 1);
            let idx = strings.intern(name).to_string();
            write_value_cell(&mut writer, &reference, Some("s"), Some(HEADER_STYLE), &idx)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    for (offset, row) in dataset.rows().iter().enumerate() {
        let row_number = offset as u32 + 2;
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        start_row(&mut writer, row_number)?;
        for (col, value) in row.iter().enumerate() {
            let reference = cell_reference(col, row_number);
            match value {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    write_value_cell(&mut writer, &reference, None, None, &n.to_string())?;
                }
                CellValue::Bool(b) => {
                    let v = if *b { "1" } else { "0" };
                    write_value_cell(&mut writer, &reference, Some("b"), None, v)?;
                }
                CellValue::Text(s) => {
                    let idx = strings.intern(s).to_string();
                    write_value_cell(&mut writer, &reference, Some("s"), None, &idx)?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn start_row(writer: &mut quick_xml::Writer<Vec<u8>>, number: u32) -> Result<()> {
    let number = number.to_string();
    writer.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", number.as_str())]),
    ))?;
    Ok(())
}

fn write_value_cell(
    writer: &mut quick_xml::Writer<Vec<u8>>,
    reference: &str,
    cell_type: Option<&str>,
    style: Option<&str>,
    value: &str,
) -> Result<()> {
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", reference));
    if let Some(s) = style {
        cell.push_attribute(("s", s));
    }
    if let Some(t) = cell_type {
        cell.push_attribute(("t", t));
    }
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("v")))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("v")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>
"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>
"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>
"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
  <Application>surveyx</Application>
</Properties>
"#;

const CORE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:creator>surveyx</dc:creator>
</cp:coreProperties>
"#;

// Style 1: bold, thin border, centered. Used for the header row.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="2">
    <border><left/><right/><top/><bottom/><diagonal/></border>
    <border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top"/></xf>
  </cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>
"#;
