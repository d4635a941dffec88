//! 3-sigma outlier clipping

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::stats::{clip_column, mean, numeric_values, sample_std};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};

const NAME: &str = "Sigma3Transformer";

/// Clipping bounds learned at fit time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaWalls {
    /// mean - 3 * std
    pub low_wall: f64,
    /// mean + 3 * std
    pub high_wall: f64,
}

/// Clips a numeric column to within three sample standard deviations of its
/// training mean.
#[derive(Debug, Clone)]
pub struct Sigma3Transformer {
    column: String,
    walls: Option<SigmaWalls>,
}

impl Sigma3Transformer {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            walls: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Fitted bounds, `None` before `fit`
    pub fn walls(&self) -> Option<SigmaWalls> {
        self.walls
    }
}

impl Transformer for Sigma3Transformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, df: &DataFrame, _labels: Option<&[i64]>, _diag: &mut Diagnostics) -> Result<()> {
        let values = numeric_values(df, &self.column, NAME)?;
        let m = mean(&values).unwrap_or(f64::NAN);
        let sigma = sample_std(&values).unwrap_or(f64::NAN);

        self.walls = Some(SigmaWalls {
            low_wall: m - 3.0 * sigma,
            high_wall: m + 3.0 * sigma,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let walls = self.walls.ok_or(PrepError::State { transformer: NAME })?;
        clip_column(df, &self.column, NAME, walls.low_wall, walls.high_wall)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::Sigma3 {
            column: self.column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name).unwrap().f64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn test_walls_from_mean_and_sample_std() {
        let df = df! {
            "x" => [2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0],
        }
        .unwrap();
        let mut t = Sigma3Transformer::new("x");
        t.fit(&df, None, &mut Diagnostics::new()).unwrap();

        let walls = t.walls().unwrap();
        let sigma = (32.0f64 / 7.0).sqrt();
        assert!((walls.low_wall - (5.0 - 3.0 * sigma)).abs() < 1e-12);
        assert!((walls.high_wall - (5.0 + 3.0 * sigma)).abs() < 1e-12);
    }

    #[test]
    fn test_clips_extreme_value() {
        let mut data = vec![10.0f64; 20];
        data.push(1000.0);
        let df = df! { "x" => data }.unwrap();

        let mut t = Sigma3Transformer::new("x");
        let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();
        let walls = t.walls().unwrap();
        let clipped = values(&out, "x");

        assert_eq!(clipped.len(), 21);
        assert!((clipped[20] - walls.high_wall).abs() < 1e-9);
        assert_eq!(clipped[0], 10.0);
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df! { "x" => [1.0f64] }.unwrap();
        let result = Sigma3Transformer::new("x").transform(&df, &mut Diagnostics::new());
        assert!(matches!(result, Err(PrepError::State { .. })));
    }

    #[test]
    fn test_fit_rejects_non_numeric() {
        let df = df! { "x" => ["a", "b"] }.unwrap();
        let result = Sigma3Transformer::new("x").fit(&df, None, &mut Diagnostics::new());
        assert!(matches!(result, Err(PrepError::Type { .. })));
    }
}
