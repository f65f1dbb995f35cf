//! Error types for the surveyx library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for surveyx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting survey files.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No input path was given.
    #[error("File path is empty.")]
    EmptyPath,

    /// The input does not carry the `.csv` extension.
    #[error("Invalid file extension. Expected .csv file.")]
    InvalidExtension(PathBuf),

    /// No line starting with the header marker was found.
    #[error("Cannot find headers in the CSV file.")]
    HeaderNotFound(PathBuf),

    /// The input file does not exist.
    #[error("File {} not found.", .0.display())]
    FileNotFound(PathBuf),

    /// The batch root is missing or is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Malformed delimited data.
    #[error("CSV parse error at line {line}: {reason}")]
    Csv { line: u64, reason: String },

    /// Error reading or writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error reading or writing XML content.
    #[error("XML error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::ZipArchive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            _ => Error::Csv { line, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FileNotFound(PathBuf::from("missing.csv"));
        assert_eq!(err.to_string(), "File missing.csv not found.");

        let err = Error::HeaderNotFound(PathBuf::from("a.csv"));
        assert_eq!(err.to_string(), "Cannot find headers in the CSV file.");

        let err = Error::InvalidExtension(PathBuf::from("a.txt"));
        assert_eq!(err.to_string(), "Invalid file extension. Expected .csv file.");

        assert_eq!(Error::EmptyPath.to_string(), "File path is empty.");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_zip_io_keeps_io() {
        let zip_err = zip::result::ZipError::Io(io::Error::new(io::ErrorKind::Other, "disk"));
        let err: Error = zip_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
