//! In-memory tabular dataset
//!
//! Datasets are stored column-major: validation checks walk one column at a
//! time, and every column has exactly `num_rows` cells.

pub mod loader;
pub mod value;

pub use loader::{DatasetFormat, DatasetLoader};
pub use value::{CellKind, CellValue, ColumnType};

use crate::error::{Result, ValidationError};

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Iterator over non-missing cells
    pub fn non_null(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_null())
    }

    /// Numeric values of the column, skipping everything else
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }

    /// Type inferred from the non-null cells
    pub fn column_type(&self) -> ColumnType {
        ColumnType::infer(&self.values)
    }
}

/// A rectangular table of named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Dataset {
    /// Build a dataset from columns of equal length with unique names
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);

        for (index, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(ValidationError::invalid_input(format!(
                    "Column '{}' has {} rows but expected {}",
                    column.name,
                    column.len(),
                    num_rows
                )));
            }
            if columns[..index].iter().any(|c| c.name == column.name) {
                return Err(ValidationError::invalid_input(format!(
                    "Duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, num_rows })
    }

    /// A dataset with no rows and no columns
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when there are no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0 || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CellValue::*;

    #[test]
    fn test_dataset_shape() {
        let ds = Dataset::new(vec![
            Column::new("a", vec![Integer(1), Null, Integer(3)]),
            Column::new("b", vec![Text("x".into()), Text("y".into()), Null]),
        ])
        .unwrap();

        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.num_columns(), 2);
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(ds.column("a").unwrap().null_count(), 1);
        assert_eq!(ds.column("a").unwrap().numeric_values(), vec![1.0, 3.0]);
        assert!(ds.column("missing").is_none());
        assert!(!ds.is_empty());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Integer(1)]),
            Column::new("b", vec![Integer(1), Integer(2)]),
        ]);
        assert!(matches!(result, Err(ValidationError::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Integer(1)]),
            Column::new("a", vec![Integer(2)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_dataset() {
        assert!(Dataset::empty().is_empty());
        let header_only = Dataset::new(vec![Column::new("a", vec![])]).unwrap();
        assert!(header_only.is_empty());
        assert_eq!(header_only.num_columns(), 1);
    }
}
