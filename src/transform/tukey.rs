//! Tukey fence outlier clipping

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::stats::{clip_column, numeric_values, quantile, sorted};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};

const NAME: &str = "TukeyTransformer";

/// Which Tukey fence to clip into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fence {
    /// Q1 - 1.5 IQR .. Q3 + 1.5 IQR
    Inner,
    /// Q1 - 3 IQR .. Q3 + 3 IQR
    #[default]
    Outer,
}

impl Fence {
    pub fn multiplier(&self) -> f64 {
        match self {
            Fence::Inner => 1.5,
            Fence::Outer => 3.0,
        }
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fence::Inner => write!(f, "inner"),
            Fence::Outer => write!(f, "outer"),
        }
    }
}

impl std::str::FromStr for Fence {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(Fence::Inner),
            "outer" => Ok(Fence::Outer),
            _ => Err(PrepError::argument(format!(
                "fence must be 'inner' or 'outer', got '{}'",
                s
            ))),
        }
    }
}

/// All four fences learned at fit time.
///
/// `outer_low <= inner_low <= inner_high <= outer_high` holds whenever
/// `IQR >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TukeyFences {
    pub inner_low: f64,
    pub inner_high: f64,
    pub outer_low: f64,
    pub outer_high: f64,
}

impl TukeyFences {
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            inner_low: q1 - Fence::Inner.multiplier() * iqr,
            inner_high: q3 + Fence::Inner.multiplier() * iqr,
            outer_low: q1 - Fence::Outer.multiplier() * iqr,
            outer_high: q3 + Fence::Outer.multiplier() * iqr,
        }
    }

    /// `(low, high)` for the chosen fence
    pub fn bounds(&self, fence: Fence) -> (f64, f64) {
        match fence {
            Fence::Inner => (self.inner_low, self.inner_high),
            Fence::Outer => (self.outer_low, self.outer_high),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TukeyTransformer {
    column: String,
    fence: Fence,
    fences: Option<TukeyFences>,
}

impl TukeyTransformer {
    pub fn new(column: impl Into<String>, fence: Fence) -> Self {
        Self {
            column: column.into(),
            fence,
            fences: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn fence(&self) -> Fence {
        self.fence
    }

    pub fn fences(&self) -> Option<TukeyFences> {
        self.fences
    }
}

impl Transformer for TukeyTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, df: &DataFrame, _labels: Option<&[i64]>, _diag: &mut Diagnostics) -> Result<()> {
        let values = sorted(&numeric_values(df, &self.column, NAME)?);
        let q1 = quantile(&values, 0.25).unwrap_or(f64::NAN);
        let q3 = quantile(&values, 0.75).unwrap_or(f64::NAN);

        self.fences = Some(TukeyFences::from_quartiles(q1, q3));
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let fences = self.fences.ok_or(PrepError::State { transformer: NAME })?;
        let (low, high) = fences.bounds(self.fence);
        clip_column(df, &self.column, NAME, low, high)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::Tukey {
            column: self.column.clone(),
            fence: self.fence,
        }
    }
}
