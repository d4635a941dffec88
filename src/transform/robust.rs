//! Median / IQR scaling

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::stats::{map_numeric_column, numeric_column, numeric_values, quantile, sorted};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};

const NAME: &str = "RobustScalerTransformer";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobustScale {
    pub median: f64,
    pub iqr: f64,
}

/// Scales a numeric column as `(x - median) / iqr`.
///
/// A zero IQR (constant or binary column) leaves the data unchanged.
#[derive(Debug, Clone)]
pub struct RobustScalerTransformer {
    column: String,
    scale: Option<RobustScale>,
}

impl RobustScalerTransformer {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            scale: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn scale(&self) -> Option<RobustScale> {
        self.scale
    }
}

impl Transformer for RobustScalerTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, df: &DataFrame, _labels: Option<&[i64]>, _diag: &mut Diagnostics) -> Result<()> {
        let values = sorted(&numeric_values(df, &self.column, NAME)?);
        let q1 = quantile(&values, 0.25).unwrap_or(f64::NAN);
        let median = quantile(&values, 0.5).unwrap_or(f64::NAN);
        let q3 = quantile(&values, 0.75).unwrap_or(f64::NAN);

        self.scale = Some(RobustScale {
            median,
            iqr: q3 - q1,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let scale = self.scale.ok_or(PrepError::State { transformer: NAME })?;

        if scale.iqr == 0.0 {
            numeric_column(df, &self.column, NAME)?;
            return Ok(df.clone());
        }

        map_numeric_column(df, &self.column, NAME, |v| (v - scale.median) / scale.iqr)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::RobustScaler {
            column: self.column.clone(),
        }
    }
}
