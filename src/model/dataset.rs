//! Tabular dataset model.

use super::CellValue;
use crate::error::{Error, Result};

/// A rectangular table of named columns.
///
/// Every row holds exactly one cell per column. Rows that would break this
/// are rejected on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Create an empty dataset with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a dataset from column names and rows.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Append a row. Its width must match the column count.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidData(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Replace the column names. The new list must keep the column count.
    pub fn set_columns(&mut self, columns: Vec<String>) -> Result<()> {
        if columns.len() != self.columns.len() {
            return Err(Error::InvalidData(format!(
                "length mismatch: dataset has {} columns, {} names given",
                self.columns.len(),
                columns.len()
            )));
        }
        self.columns = columns;
        Ok(())
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Remove the column at `index` from the names and every row.
    pub fn remove_column(&mut self, index: usize) -> Option<String> {
        if index >= self.columns.len() {
            return None;
        }
        for row in &mut self.rows {
            row.remove(index);
        }
        Some(self.columns.remove(index))
    }

    /// Iterate over the values of a named column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut ds = Dataset::new(names(&["A", "B"]));
        assert!(ds.push_row(vec![1.0.into(), "x".into()]).is_ok());
        assert!(ds.push_row(vec![1.0.into()]).is_err());
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn test_set_columns_keeps_count() {
        let mut ds = Dataset::new(names(&["A", "B"]));
        assert!(ds.set_columns(names(&["B", "C"])).is_ok());
        assert_eq!(ds.columns(), &["B", "C"]);
        assert!(ds.set_columns(names(&["B"])).is_err());
    }

    #[test]
    fn test_remove_column() {
        let mut ds = Dataset::with_rows(
            names(&["A", "B", "C"]),
            vec![vec![1.0.into(), 2.0.into(), 3.0.into()]],
        )
        .unwrap();

        assert_eq!(ds.remove_column(1), Some("B".to_string()));
        assert_eq!(ds.columns(), &["A", "C"]);
        assert_eq!(ds.rows()[0], vec![CellValue::Number(1.0), CellValue::Number(3.0)]);
        assert_eq!(ds.remove_column(5), None);
    }

    #[test]
    fn test_column_values() {
        let ds = Dataset::with_rows(
            names(&["A", "B"]),
            vec![
                vec![1.0.into(), "x".into()],
                vec![2.0.into(), "y".into()],
            ],
        )
        .unwrap();

        let b: Vec<_> = ds.column("B").unwrap().cloned().collect();
        assert_eq!(b, vec![CellValue::text("x"), CellValue::text("y")]);
        assert!(ds.column("Z").is_none());
    }
}
