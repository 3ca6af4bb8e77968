//! Cell values and inferred column types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a tabular dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

/// Kind of a non-null cell; integers and floats share one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Number,
    Boolean,
    Text,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Number => write!(f, "number"),
            CellKind::Boolean => write!(f, "boolean"),
            CellKind::Text => write!(f, "text"),
        }
    }
}

impl CellValue {
    /// Whether the cell is missing
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Whether the cell holds a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Numeric value of the cell, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Kind of the cell, `None` for nulls
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(_) | CellValue::Float(_) => Some(CellKind::Number),
            CellValue::Boolean(_) => Some(CellKind::Boolean),
            CellValue::Text(_) => Some(CellKind::Text),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Type of a column inferred from its non-null cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every cell is null
    Empty,
    Integer,
    Float,
    Boolean,
    Text,
    /// More than one cell kind present
    Mixed(Vec<String>),
}

impl ColumnType {
    /// Infer the type of a sequence of cells
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_text = false;

        for cell in cells {
            match cell {
                CellValue::Null => {}
                CellValue::Integer(_) => has_int = true,
                CellValue::Float(_) => has_float = true,
                CellValue::Boolean(_) => has_bool = true,
                CellValue::Text(_) => has_text = true,
            }
        }

        let has_number = has_int || has_float;
        let kinds = [has_number, has_bool, has_text]
            .iter()
            .filter(|present| **present)
            .count();

        match kinds {
            0 => ColumnType::Empty,
            1 if has_float => ColumnType::Float,
            1 if has_int => ColumnType::Integer,
            1 if has_bool => ColumnType::Boolean,
            1 => ColumnType::Text,
            _ => {
                let mut names = Vec::new();
                if has_number {
                    names.push(CellKind::Number.to_string());
                }
                if has_bool {
                    names.push(CellKind::Boolean.to_string());
                }
                if has_text {
                    names.push(CellKind::Text.to_string());
                }
                ColumnType::Mixed(names)
            }
        }
    }

    /// Whether every non-null cell is a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Empty => write!(f, "empty"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Mixed(types) => write!(f, "mixed({})", types.join("|")),
        }
    }
}
