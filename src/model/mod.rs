//! In-memory model for survey tables.
//!
//! The loader turns delimited text into a [`Dataset`], transformations
//! reshape it, and the XLSX writer serializes it.

mod cell;
mod dataset;

pub use cell::*;
pub use dataset::*;
