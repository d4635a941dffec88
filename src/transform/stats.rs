//! Column statistics used by the fitted transformers

use faer::Mat;
use polars::prelude::*;

use super::values::require_column;
use crate::error::{PrepError, Result};

/// Check that `column` exists and is numeric, returning it cast to Float64.
pub(crate) fn numeric_column(
    df: &DataFrame,
    column: &str,
    transformer: &'static str,
) -> Result<Column> {
    let col = require_column(df, column, transformer)?;
    if !col.dtype().is_primitive_numeric() {
        return Err(PrepError::Type {
            transformer,
            column: column.to_string(),
            dtype: col.dtype().to_string(),
        });
    }
    Ok(col.cast(&DataType::Float64)?)
}

/// Non-missing values of a numeric column (nulls and NaN skipped).
pub(crate) fn numeric_values(
    df: &DataFrame,
    column: &str,
    transformer: &'static str,
) -> Result<Vec<f64>> {
    let col = numeric_column(df, column, transformer)?;
    let values: Vec<f64> = col
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    if values.is_empty() {
        return Err(PrepError::argument(format!(
            "{}.fit found no non-missing values in '{}'",
            transformer, column
        )));
    }
    Ok(values)
}

/// Replace `column` by applying `f` to every non-null value.
/// The result is Float64 and keeps the column's position.
pub(crate) fn map_numeric_column(
    df: &DataFrame,
    column: &str,
    transformer: &'static str,
    f: impl Fn(f64) -> f64,
) -> Result<DataFrame> {
    let col = numeric_column(df, column, transformer)?;
    let mapped: Vec<Option<f64>> = col.f64()?.into_iter().map(|v| v.map(&f)).collect();

    let mut out = df.clone();
    out.with_column(Column::new(col.name().clone(), mapped))?;
    Ok(out)
}

/// Clip every value of `column` into `[low, high]`.
///
/// Nulls and NaN cells stay missing. Uses `max`/`min` rather than `clamp`
/// so NaN bounds leave values untouched.
pub(crate) fn clip_column(
    df: &DataFrame,
    column: &str,
    transformer: &'static str,
    low: f64,
    high: f64,
) -> Result<DataFrame> {
    map_numeric_column(df, column, transformer, |v| {
        if v.is_nan() {
            v
        } else {
            v.max(low).min(high)
        }
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). A single value has zero spread.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be ascending.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Build an `n_rows x n_cols` matrix from numeric columns, nulls as NaN.
/// Non-numeric columns fail with a `Type` error.
pub fn numeric_matrix(
    df: &DataFrame,
    columns: &[String],
    transformer: &'static str,
) -> Result<Mat<f64>> {
    let n_rows = df.height();
    let mut m = Mat::<f64>::zeros(n_rows, columns.len());

    for (j, name) in columns.iter().enumerate() {
        let col = numeric_column(df, name, transformer)?;
        for (i, v) in col.f64()?.into_iter().enumerate() {
            m[(i, j)] = v.unwrap_or(f64::NAN);
        }
    }

    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_linear_interpolation() {
        let s = sorted(&[10.0, 12.0, 14.0, 15.0, 200.0]);
        assert_eq!(quantile(&s, 0.25), Some(12.0));
        assert_eq!(quantile(&s, 0.5), Some(14.0));
        assert_eq!(quantile(&s, 0.75), Some(15.0));

        let s = sorted(&[1.0, 2.0, 3.0, 4.0]);
        assert!((quantile(&s, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((quantile(&s, 0.75).unwrap() - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population std is 2.0, sample std is sqrt(32/7)
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((sample_std(&v).unwrap() - expected).abs() < 1e-12);
        assert_eq!(sample_std(&[3.0]), Some(0.0));
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn test_numeric_values_rejects_strings() {
        let df = df! {
            "name" => ["a", "b"],
        }
        .unwrap();
        let result = numeric_values(&df, "name", "T");
        assert!(matches!(result, Err(PrepError::Type { .. })));
    }

    #[test]
    fn test_numeric_values_skips_nulls() {
        let df = df! {
            "x" => [Some(1.0f64), None, Some(3.0)],
        }
        .unwrap();
        assert_eq!(numeric_values(&df, "x", "T").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_clip_keeps_missing_cells() {
        let df = df! {
            "x" => [Some(1.0f64), Some(f64::NAN), None, Some(50.0)],
        }
        .unwrap();
        let out = clip_column(&df, "x", "T", 0.0, 10.0).unwrap();
        let values: Vec<Option<f64>> = out.column("x").unwrap().f64().unwrap().into_iter().collect();

        assert_eq!(values[0], Some(1.0));
        assert!(values[1].unwrap().is_nan());
        assert_eq!(values[2], None);
        assert_eq!(values[3], Some(10.0));
    }

    #[test]
    fn test_numeric_matrix_nulls_are_nan() {
        let df = df! {
            "a" => [Some(1.0f64), None],
            "b" => [3i32, 4],
        }
        .unwrap();
        let m = numeric_matrix(&df, &["a".to_string(), "b".to_string()], "T").unwrap();
        assert_eq!(m.nrows(), 2);
        assert_eq!(m[(0, 0)], 1.0);
        assert!(m[(1, 0)].is_nan());
        assert_eq!(m[(1, 1)], 4.0);
    }
}
