//! Delimited text loading.

use crate::error::{Error, Result};
use crate::model::{CellValue, Dataset};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Cell texts that load as missing values.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#NA", "<NA>", "-NaN", "-nan", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan",
    "null",
];

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Number,
    Bool,
    Text,
}

/// Load a delimited file, using line `header_line` as the column-name row.
///
/// Every line before `header_line` is skipped.
pub fn load_dataset(path: impl AsRef<Path>, header_line: usize, delimiter: u8) -> Result<Dataset> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    parse_dataset(&data, header_line, delimiter)
}

/// Parse delimited bytes, using line `header_line` as the column-name row.
pub fn parse_dataset(data: &[u8], header_line: usize, delimiter: u8) -> Result<Dataset> {
    let mut table = skip_lines(data, header_line);
    if header_line == 0 {
        table = table.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(table);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(table);

    let mut record = csv::ByteRecord::new();
    if !reader
        .read_byte_record(&mut record)
        .map_err(|e| shift_error_line(e.into(), header_line))?
    {
        return Err(Error::Csv {
            line: header_line as u64 + 1,
            reason: "header line is empty".to_string(),
        });
    }
    let columns = normalize_header_names(record.iter().map(decode_field).collect());
    let width = columns.len();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                if record.len() > width {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    return Err(Error::Csv {
                        line: line + header_line as u64,
                        reason: format!("expected {} fields, saw {}", width, record.len()),
                    });
                }
                let mut row: Vec<String> = record.iter().map(decode_field).collect();
                row.resize(width, String::new());
                raw_rows.push(row);
            }
            Err(e) => return Err(shift_error_line(e.into(), header_line)),
        }
    }

    let kinds: Vec<ColumnKind> = (0..width).map(|i| infer_column(&raw_rows, i)).collect();
    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(field, kind)| to_cell(field, *kind))
                .collect()
        })
        .collect();

    Dataset::with_rows(columns, rows)
}

/// Return the slice starting at the given zero-based line.
fn skip_lines(data: &[u8], lines: usize) -> &[u8] {
    let mut start = 0;
    for _ in 0..lines {
        match data[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => start += offset + 1,
            None => return &[],
        }
    }
    &data[start..]
}

/// Report CSV line numbers relative to the whole file.
fn shift_error_line(err: Error, header_line: usize) -> Error {
    match err {
        Error::Csv { line, reason } => Error::Csv {
            line: line + header_line as u64,
            reason,
        },
        other => other,
    }
}

fn decode_field(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Name blank headers by position and de-duplicate repeated names.
///
/// `["A", "", "A"]` becomes `["A", "Unnamed: 1", "A.1"]`.
pub fn normalize_header_names(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };

        let mut candidate = base.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", base, count);
        }
        seen.insert(candidate.clone(), 0);
        seen.entry(base).or_insert(0);
        names.push(candidate);
    }

    names
}

fn is_missing(field: &str) -> bool {
    MISSING_TOKENS.contains(&field)
}

fn parse_number(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    // Reject the spellings Rust accepts but spreadsheets treat as text.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(field: &str) -> Option<bool> {
    match field.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn infer_column(rows: &[Vec<String>], index: usize) -> ColumnKind {
    let mut values = rows
        .iter()
        .map(|row| row[index].as_str())
        .filter(|field| !is_missing(field))
        .peekable();

    if values.peek().is_none() {
        return ColumnKind::Text;
    }

    let values: Vec<&str> = values.collect();
    if values.iter().all(|v| parse_number(v).is_some()) {
        ColumnKind::Number
    } else if values.iter().all(|v| parse_bool(v).is_some()) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn to_cell(field: String, kind: ColumnKind) -> CellValue {
    if is_missing(&field) {
        return CellValue::Empty;
    }
    match kind {
        ColumnKind::Number => parse_number(&field).map_or(CellValue::Text(field), CellValue::Number),
        ColumnKind::Bool => parse_bool(&field).map_or(CellValue::Text(field), CellValue::Bool),
        ColumnKind::Text => CellValue::Text(field),
    }
}
