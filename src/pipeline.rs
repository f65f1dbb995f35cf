//! Conversion pipeline.
//!
//! One file goes through: header detection, loading, shift-and-trim, output
//! path preparation and workbook export. Batch mode repeats that for every
//! CSV file below a directory.

use crate::error::{Error, Result};
use crate::options::{ConvertOptions, FailurePolicy};
use crate::survey::{
    has_csv_suffix, load_dataset, locate_header_line, prepare_output_path, walk_csv_files,
};
use crate::transform::shift_and_trim;
use crate::xlsx::write_xlsx;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A problem that does not stop conversion under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The input path is empty
    EmptyPath,
    /// The input does not end in `.csv`
    InvalidExtension(PathBuf),
    /// The batch root is missing or is not a directory
    NotADirectory(PathBuf),
    /// A directory entry could not be read and was skipped
    UnreadableEntry(PathBuf, String),
}

impl Warning {
    /// The error this warning becomes under [`FailurePolicy::FailFast`].
    fn into_error(self) -> Error {
        match self {
            Warning::EmptyPath => Error::EmptyPath,
            Warning::InvalidExtension(path) => Error::InvalidExtension(path),
            Warning::NotADirectory(path) => Error::NotADirectory(path),
            Warning::UnreadableEntry(path, reason) => {
                Error::InvalidData(format!("cannot read {}: {}", path.display(), reason))
            }
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyPath => f.write_str("File path is empty."),
            Warning::InvalidExtension(_) => {
                f.write_str("Invalid file extension. Expected .csv file.")
            }
            Warning::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            Warning::UnreadableEntry(path, reason) => {
                write!(f, "Skipped unreadable entry {}: {}", path.display(), reason)
            }
        }
    }
}

/// Outcome of a converted file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Input CSV path
    pub input: PathBuf,
    /// Written workbook path
    pub output: PathBuf,
    /// Zero-based line the header was found on
    pub header_line: usize,
    /// Data rows written
    pub rows: usize,
    /// Columns written
    pub columns: usize,
    /// Warnings raised along the way
    pub warnings: Vec<Warning>,
}

/// Outcome of a directory run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files converted successfully, in processing order
    pub converted: Vec<FileReport>,
    /// Files that failed, with their errors
    pub failed: Vec<(PathBuf, Error)>,
    /// Problems with the directory itself
    pub warnings: Vec<Warning>,
}

impl BatchReport {
    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    /// Check if every file converted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Receives pipeline events as they happen.
///
/// All methods default to doing nothing.
pub trait ConvertObserver {
    /// A batch is about to convert `input`.
    fn on_start(&mut self, _input: &Path) {}

    /// A warning was raised for `input`.
    fn on_warning(&mut self, _input: &Path, _warning: &Warning) {}

    /// A batch converted a file.
    fn on_converted(&mut self, _report: &FileReport) {}

    /// A batch failed to convert `input` and moved on.
    fn on_failed(&mut self, _input: &Path, _error: &Error) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ConvertObserver for NoopObserver {}

/// Converts survey CSV files to XLSX workbooks.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Get the options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one CSV file to `<dir>/out/<stem>.xlsx`.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        observer: &mut dyn ConvertObserver,
    ) -> Result<FileReport> {
        let input = input.as_ref();
        let mut warnings = Vec::new();

        if input.as_os_str().is_empty() {
            self.raise(input, Warning::EmptyPath, &mut warnings, observer)?;
        }
        if !has_csv_suffix(input) {
            let warning = Warning::InvalidExtension(input.to_path_buf());
            self.raise(input, warning, &mut warnings, observer)?;
        }

        let header_line = locate_header_line(input, &self.options.header_marker)?
            .ok_or_else(|| Error::HeaderNotFound(input.to_path_buf()))?;
        debug!(input = %input.display(), header_line, "located header line");

        let mut dataset = load_dataset(input, header_line, self.options.delimiter)?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "loaded dataset"
        );

        shift_and_trim(&mut dataset, &self.options.placeholder_column)?;

        let output = prepare_output_path(input, &self.options.output_dir_name)?;
        write_xlsx(&dataset, &output, &self.options.sheet_name)?;
        info!(input = %input.display(), output = %output.display(), "wrote workbook");

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            header_line,
            rows: dataset.row_count(),
            columns: dataset.column_count(),
            warnings,
        })
    }

    /// Convert every `.csv` file below `dir`.
    ///
    /// Under [`FailurePolicy::FailFast`] the first failure is returned and the
    /// remaining files are not touched. Under [`FailurePolicy::Continue`] a
    /// missing root yields an empty report with a warning, and unreadable
    /// entries are skipped.
    pub fn convert_directory(
        &self,
        dir: impl AsRef<Path>,
        observer: &mut dyn ConvertObserver,
    ) -> Result<BatchReport> {
        let dir = dir.as_ref();
        let fail_fast = self.options.failure_policy == FailurePolicy::FailFast;
        let mut report = BatchReport::default();

        let walked = walk_csv_files(dir, |path, err| {
            if fail_fast {
                return Err(err);
            }
            warn!(path = %path.display(), error = %err, "skipping unreadable entry");
            let warning = Warning::UnreadableEntry(path, err.to_string());
            observer.on_warning(dir, &warning);
            report.warnings.push(warning);
            Ok(())
        });
        let files = match walked {
            Ok(files) => files,
            Err(Error::NotADirectory(root)) => {
                self.raise(dir, Warning::NotADirectory(root), &mut report.warnings, observer)?;
                return Ok(report);
            }
            Err(e) => return Err(e),
        };
        debug!(count = files.len(), "discovered CSV files");

        for file in files {
            observer.on_start(&file);
            match self.convert_file(&file, observer) {
                Ok(converted) => {
                    observer.on_converted(&converted);
                    report.converted.push(converted);
                }
                Err(e) if fail_fast => return Err(e),
                Err(e) => {
                    warn!(input = %file.display(), error = %e, "conversion failed");
                    observer.on_failed(&file, &e);
                    report.failed.push((file, e));
                }
            }
        }

        Ok(report)
    }

    /// Report a warning, or turn it into an error under fail-fast.
    fn raise(
        &self,
        input: &Path,
        warning: Warning,
        warnings: &mut Vec<Warning>,
        observer: &mut dyn ConvertObserver,
    ) -> Result<()> {
        if self.options.failure_policy == FailurePolicy::FailFast {
            return Err(warning.into_error());
        }
        warn!(input = %input.display(), "{}", warning);
        observer.on_warning(input, &warning);
        warnings.push(warning);
        Ok(())
    }
}
