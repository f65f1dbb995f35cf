//! Survey CSV input handling.
//!
//! Instrument exports put a free-form preamble above the table, so the
//! header row is located by content before the data is read.
//!
//! # Example
//!
//! ```no_run
//! use surveyx::survey::{load_dataset, locate_header_line};
//!
//! if let Some(line) = locate_header_line("survey.csv", "ID")? {
//!     let dataset = load_dataset("survey.csv", line, b',')?;
//!     println!("{} rows", dataset.row_count());
//! }
//! # Ok::<(), surveyx::Error>(())
//! ```

mod discover;
mod header;
mod loader;
mod paths;

pub use discover::{has_csv_suffix, walk_csv_files, CSV_SUFFIX};
pub use header::{locate_header_line, locate_header_line_in};
pub use loader::{load_dataset, normalize_header_names, parse_dataset};
pub use paths::{derive_output_path, prepare_output_path, OUTPUT_EXTENSION};
