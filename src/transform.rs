//! Header shift-and-trim.
//!
//! The instrument writes its header row one label to the right of the data
//! it describes. Shifting every label one position to the left lines the
//! names up with their data; the trailing column that ends up with only a
//! placeholder name is then dropped.

use crate::error::Result;
use crate::model::Dataset;

/// Shift column names left, append `placeholder`, then drop the last column.
///
/// For columns `[A, B, C]` the result has columns `[B, C]`, holding the data
/// originally under `A` and `B`.
pub fn shift_and_trim(dataset: &mut Dataset, placeholder: &str) -> Result<()> {
    shift_headers_left(dataset, placeholder)?;
    drop_last_column(dataset);
    Ok(())
}

/// Replace the column names with all but the first, followed by `placeholder`.
///
/// A dataset without columns is left untouched.
pub fn shift_headers_left(dataset: &mut Dataset, placeholder: &str) -> Result<()> {
    if dataset.column_count() == 0 {
        return Ok(());
    }
    let mut names: Vec<String> = dataset.columns()[1..].to_vec();
    names.push(placeholder.to_string());
    dataset.set_columns(names)
}

/// Remove the final column by position.
pub fn drop_last_column(dataset: &mut Dataset) -> Option<String> {
    let count = dataset.column_count();
    if count == 0 {
        return None;
    }
    dataset.remove_column(count - 1)
}
