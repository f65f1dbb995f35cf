//! Output path derivation.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of produced workbooks.
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Derive `<input_dir>/<out_dir>/<stem>.xlsx` without touching the filesystem.
pub fn derive_output_path(input: impl AsRef<Path>, out_dir: &str) -> PathBuf {
    let input = input.as_ref();
    let stem = input.file_stem().unwrap_or_default();
    let parent = input.parent().unwrap_or(Path::new(""));

    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);

    parent.join(out_dir).join(file_name)
}

/// Derive the output path and make sure its directory exists.
pub fn prepare_output_path(input: impl AsRef<Path>, out_dir: &str) -> Result<PathBuf> {
    let output = derive_output_path(input, out_dir);
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir)?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path("/data/survey1.csv", "out"),
            PathBuf::from("/data/out/survey1.xlsx")
        );
        assert_eq!(
            derive_output_path("survey.backup.csv", "out"),
            PathBuf::from("out/survey.backup.xlsx")
        );
        assert_eq!(
            derive_output_path("/data/noext", "converted"),
            PathBuf::from("/data/converted/noext.xlsx")
        );
    }

    #[test]
    fn test_prepare_output_path_creates_and_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("survey1.csv");

        let first = prepare_output_path(&input, "out").unwrap();
        assert_eq!(first, dir.path().join("out").join("survey1.xlsx"));
        assert!(dir.path().join("out").is_dir());

        let second = prepare_output_path(&input, "out").unwrap();
        assert_eq!(first, second);
    }
}
