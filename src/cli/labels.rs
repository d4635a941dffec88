//! Target column analysis and label extraction
//!
//! Classification labels must be binary 0/1. Numeric targets that already
//! hold only 0 and 1 are used as is; anything else needs an explicit event /
//! non-event mapping.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::transform::values::column_keys;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

const SOURCE: &str = "labels";

/// Mapping configuration for converting target column values to binary 0/1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }
}

/// Result of analyzing a target column
#[derive(Debug, Clone, PartialEq)]
pub enum TargetAnalysis {
    /// Target column is already binary 0/1, no mapping needed
    AlreadyBinary,
    /// Target column needs mapping - contains these unique values
    NeedsMapping { unique_values: Vec<String> },
}

fn target_column<'a>(df: &'a DataFrame, target: &str) -> Result<&'a Column> {
    df.column(target)
        .map_err(|_| PrepError::missing_column(SOURCE, target))
}

/// Determine whether a target column can be used directly as labels
pub fn analyze_target_column(df: &DataFrame, target: &str) -> Result<TargetAnalysis> {
    let col = target_column(df, target)?;

    if col.len() == 0 {
        return Err(PrepError::argument(format!("target column '{}' is empty", target)));
    }
    if col.null_count() == col.len() {
        return Err(PrepError::argument(format!(
            "target column '{}' contains only null values",
            target
        )));
    }

    if col.dtype().is_primitive_numeric() {
        let floats = col.cast(&DataType::Float64)?;
        let is_binary = floats
            .f64()?
            .into_iter()
            .flatten()
            .all(|v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);
        if is_binary {
            return Ok(TargetAnalysis::AlreadyBinary);
        }
    }

    let mut unique_values: Vec<String> = column_keys(col)?.into_iter().flatten().collect();
    unique_values.sort();
    unique_values.dedup();
    Ok(TargetAnalysis::NeedsMapping { unique_values })
}

/// Turn the target column into 0/1 labels.
///
/// Without a mapping the column must already be binary. With a mapping,
/// every row must match either the event or the non-event value; missing or
/// unmatched targets are an `Argument` error naming the first offending row.
pub fn extract_labels(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<Vec<i64>> {
    let col = target_column(df, target)?;

    let mapping = match mapping {
        Some(mapping) => mapping,
        None => {
            return match analyze_target_column(df, target)? {
                TargetAnalysis::AlreadyBinary => binary_labels(col, target),
                TargetAnalysis::NeedsMapping { unique_values } => Err(PrepError::argument(format!(
                    "target column '{}' is not binary 0/1 (values: {:?}); \
                     pass an event and non-event value",
                    target, unique_values
                ))),
            };
        }
    };

    column_keys(col)?
        .into_iter()
        .enumerate()
        .map(|(row, key)| match key {
            Some(k) if k == mapping.event_value => Ok(1),
            Some(k) if k == mapping.non_event_value => Ok(0),
            other => Err(PrepError::argument(format!(
                "row {} of target '{}' is {:?}, neither event '{}' nor non-event '{}'",
                row, target, other, mapping.event_value, mapping.non_event_value
            ))),
        })
        .collect()
}

fn binary_labels(col: &Column, target: &str) -> Result<Vec<i64>> {
    let floats = col.cast(&DataType::Float64)?;
    floats
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(v) => Ok(i64::from((v - 1.0).abs() < TOLERANCE)),
            None => Err(PrepError::argument(format!(
                "row {} of target '{}' is missing",
                row, target
            ))),
        })
        .collect()
}

/// Count how many records match the event and non-event values
pub fn count_mapped_records(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> Result<(usize, usize, usize)> {
    let keys = column_keys(target_column(df, target)?)?;

    let events = keys
        .iter()
        .filter(|k| k.as_deref() == Some(mapping.event_value.as_str()))
        .count();
    let non_events = keys
        .iter()
        .filter(|k| k.as_deref() == Some(mapping.non_event_value.as_str()))
        .count();
    Ok((events, non_events, keys.len() - events - non_events))
}
