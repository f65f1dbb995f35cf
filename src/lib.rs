//! # surveyx
//!
//! Convert survey CSV exports into XLSX workbooks.
//!
//! Instrument exports start with a free-form preamble; the table begins at
//! the first line starting with `ID`. The header row is misaligned by one
//! position relative to the data, so column names are shifted left and the
//! trailing placeholder column is dropped before the workbook is written to
//! an `out` directory next to the input.
//!
//! ## Quick Start
//!
//! ```no_run
//! // One file: survey1.csv -> out/survey1.xlsx
//! let report = surveyx::convert_file("data/survey1.csv")?;
//! println!("wrote {}", report.output.display());
//!
//! // Every .csv below a directory
//! let batch = surveyx::convert_directory("data")?;
//! println!("{} of {} converted", batch.converted.len(), batch.total());
//! # Ok::<(), surveyx::Error>(())
//! ```
//!
//! ## Options and events
//!
//! ```no_run
//! use surveyx::{ConvertOptions, Converter, NoopObserver};
//!
//! let converter = Converter::new(ConvertOptions::new().with_delimiter(b';').fail_fast());
//! converter.convert_directory("data", &mut NoopObserver)?;
//! # Ok::<(), surveyx::Error>(())
//! ```

pub mod error;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod survey;
pub mod transform;
pub mod xlsx;

// Re-exports
pub use error::{Error, Result};
pub use model::{CellValue, Dataset};
pub use options::{ConvertOptions, FailurePolicy};
pub use pipeline::{
    BatchReport, ConvertObserver, Converter, FileReport, NoopObserver, Warning,
};

use std::path::Path;

/// Convert one survey CSV file with default options.
///
/// # Example
///
/// ```no_run
/// let report = surveyx::convert_file("survey1.csv")?;
/// assert!(report.output.ends_with("out/survey1.xlsx"));
/// # Ok::<(), surveyx::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>) -> Result<FileReport> {
    Converter::default().convert_file(path, &mut NoopObserver)
}

/// Convert every `.csv` file below a directory with default options.
///
/// Failed files are collected in the returned report.
pub fn convert_directory(dir: impl AsRef<Path>) -> Result<BatchReport> {
    Converter::default().convert_directory(dir, &mut NoopObserver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_file_missing() {
        let err = convert_file("test-files/missing.csv").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_convert_directory_missing() {
        let err = convert_directory("test-files/missing-dir").unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
