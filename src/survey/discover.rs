//! Recursive discovery of CSV inputs.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// File name suffix of survey exports. Matched case-sensitively.
pub const CSV_SUFFIX: &str = ".csv";

/// Check whether a path names a CSV file.
pub fn has_csv_suffix(path: &Path) -> bool {
    path.to_str().is_some_and(|s| s.ends_with(CSV_SUFFIX))
}

/// Collect every `.csv` file below `root`.
///
/// Entries are visited in file-name order at each level, so the result is
/// stable across runs. Entries that cannot be read go to `on_error` with
/// their path, which decides whether the walk goes on (`Ok`) or stops with
/// its error. A missing root is always [`Error::NotADirectory`].
pub fn walk_csv_files<F>(root: impl AsRef<Path>, mut on_error: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(PathBuf, Error) -> Result<()>,
{
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let err = match e.into_io_error() {
                    Some(io) => Error::Io(io),
                    None => {
                        Error::InvalidData("filesystem loop while walking directory".to_string())
                    }
                };
                on_error(path, err)?;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(CSV_SUFFIX))
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
