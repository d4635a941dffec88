//! Cell values and column references shared by the recoding transformers

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PrepError, Result};

/// A single scalar cell value, independent of the column dtype.
///
/// Used for mapping keys and replacement values. Two values match when their
/// textual keys match, so `1i64` and `1.0f64` address the same cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl CellValue {
    /// Textual key used for lookups against column contents
    pub fn key(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(x) => format!("{}", x),
            CellValue::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Str(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Str(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A column addressed by name or by zero-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl ColumnRef {
    /// Resolve to a column name present in `df`.
    pub fn resolve(&self, df: &DataFrame, transformer: &'static str) -> Result<String> {
        match self {
            ColumnRef::Name(name) => {
                if df.column(name).is_ok() {
                    Ok(name.clone())
                } else {
                    Err(PrepError::missing_column(transformer, name.clone()))
                }
            }
            ColumnRef::Position(idx) => df
                .get_columns()
                .get(*idx)
                .map(|col| col.name().to_string())
                .ok_or_else(|| PrepError::missing_column(transformer, format!("#{}", idx))),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(name) => write!(f, "{}", name),
            ColumnRef::Position(idx) => write!(f, "#{}", idx),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        ColumnRef::Name(s.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::Name(s)
    }
}

impl From<usize> for ColumnRef {
    fn from(idx: usize) -> Self {
        ColumnRef::Position(idx)
    }
}

/// Look up a column by name, mapping absence to a `Schema` error.
pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    column: &str,
    transformer: &'static str,
) -> Result<&'a Column> {
    df.column(column)
        .map_err(|_| PrepError::missing_column(transformer, column))
}

/// Read a column as typed cells, `None` for nulls.
pub fn column_cells(col: &Column) -> Result<Vec<Option<CellValue>>> {
    let cells: Vec<Option<CellValue>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| CellValue::Str(s.to_string())))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(CellValue::Int))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| CellValue::Int(n as i64)))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(CellValue::Float))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(CellValue::Bool))
            .collect(),
        _ => {
            // Categorical and friends: compare on their string form
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| CellValue::Str(s.to_string())))
                .collect()
        }
    };

    Ok(cells)
}

/// Read a column as textual keys, `None` for nulls.
pub fn column_keys(col: &Column) -> Result<Vec<Option<String>>> {
    Ok(column_cells(col)?
        .into_iter()
        .map(|cell| cell.map(|c| c.key()))
        .collect())
}

/// Build a column from cells, picking the narrowest dtype that holds them all:
/// Int64, then Float64, then Boolean, otherwise String.
pub fn cells_to_column(name: PlSmallStr, cells: Vec<Option<CellValue>>) -> Column {
    let present = || cells.iter().flatten();

    if present().all(|c| matches!(c, CellValue::Int(_))) && present().next().is_some() {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Some(CellValue::Int(n)) => Some(*n),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }

    if present().all(|c| matches!(c, CellValue::Int(_) | CellValue::Float(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Some(CellValue::Int(n)) => Some(*n as f64),
                Some(CellValue::Float(x)) => Some(*x),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }

    if present().all(|c| matches!(c, CellValue::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Some(CellValue::Bool(b)) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }

    let values: Vec<Option<String>> = cells.iter().map(|c| c.as_ref().map(|v| v.key())).collect();
    Column::new(name, values)
}
