//! XLSX (Excel) workbook output and read-back.
//!
//! Workbooks are assembled as a minimal Office Open XML package: a single
//! worksheet, a shared string table, and one bold header style.
//!
//! # Example
//!
//! ```no_run
//! use surveyx::model::Dataset;
//! use surveyx::xlsx::{write_xlsx, XlsxReader};
//!
//! let dataset = Dataset::new(vec!["Depth".to_string()]);
//! write_xlsx(&dataset, "survey.xlsx", "Sheet1")?;
//!
//! let reader = XlsxReader::open("survey.xlsx")?;
//! println!("{:?}", reader.sheet_names());
//! # Ok::<(), surveyx::Error>(())
//! ```

mod cell_ref;
mod package;
mod reader;
mod shared_strings;
mod writer;

/// SpreadsheetML main namespace.
pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace.
pub(crate) const NS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub use cell_ref::{cell_reference, column_letters, parse_cell_reference};
pub use package::{is_zip_file, XlsxPackage};
pub use reader::{SheetData, XlsxReader};
pub use shared_strings::SharedStrings;
pub use writer::{to_xlsx_bytes, write_xlsx};
