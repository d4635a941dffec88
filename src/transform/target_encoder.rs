//! Smoothed target encoding
//!
//! Each category is replaced by a blend of its own mean label and the global
//! mean label:
//!
//! ```text
//! encoded = (n * category_mean + m * global_mean) / (n + m)
//! ```
//!
//! where `n` is the category frequency in the training data and `m` the
//! smoothing factor. Categories never seen during fit become null so a later
//! imputation stage can fill them.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::values::{column_keys, require_column};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};

const NAME: &str = "TargetEncoderTransformer";

/// State learned at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEncoding {
    pub global_mean: f64,
    pub encoding: BTreeMap<String, f64>,
}

impl TargetEncoding {
    /// Encoded value for a category key; `None` for unseen categories.
    pub fn lookup(&self, category: &str) -> Option<f64> {
        self.encoding.get(category).copied()
    }
}

#[derive(Debug, Clone)]
pub struct TargetEncoderTransformer {
    column: String,
    smoothing: f64,
    state: Option<TargetEncoding>,
}

impl TargetEncoderTransformer {
    /// Smoothing must be finite and non-negative.
    pub fn new(column: impl Into<String>, smoothing: f64) -> Result<Self> {
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(PrepError::argument(format!(
                "{} smoothing must be a finite value >= 0, got {}",
                NAME, smoothing
            )));
        }
        Ok(Self {
            column: column.into(),
            smoothing,
            state: None,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn encoding(&self) -> Option<&TargetEncoding> {
        self.state.as_ref()
    }
}

impl Transformer for TargetEncoderTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, df: &DataFrame, labels: Option<&[i64]>, _diag: &mut Diagnostics) -> Result<()> {
        let labels = labels.ok_or_else(|| {
            PrepError::argument(format!("{}.fit requires labels but none were given", NAME))
        })?;

        if labels.len() != df.height() {
            return Err(PrepError::argument(format!(
                "{}.fit got {} labels for {} rows",
                NAME,
                labels.len(),
                df.height()
            )));
        }
        if labels.is_empty() {
            return Err(PrepError::argument(format!("{}.fit got an empty dataset", NAME)));
        }

        let keys = column_keys(require_column(df, &self.column, NAME)?)?;

        let global_mean = labels.iter().map(|&y| y as f64).sum::<f64>() / labels.len() as f64;

        // (count, label sum) per category; rows with a missing category are skipped
        let mut groups: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for (key, &y) in keys.into_iter().zip(labels.iter()) {
            if let Some(key) = key {
                let entry = groups.entry(key).or_insert((0.0, 0.0));
                entry.0 += 1.0;
                entry.1 += y as f64;
            }
        }

        let m = self.smoothing;
        let encoding = groups
            .into_iter()
            .map(|(category, (n, sum))| {
                let category_mean = sum / n;
                (category, (n * category_mean + m * global_mean) / (n + m))
            })
            .collect();

        self.state = Some(TargetEncoding {
            global_mean,
            encoding,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or(PrepError::State { transformer: NAME })?;
        let col = require_column(df, &self.column, NAME)?;

        let encoded: Vec<Option<f64>> = column_keys(col)?
            .iter()
            .map(|key| key.as_deref().and_then(|k| state.lookup(k)))
            .collect();

        let mut out = df.clone();
        out.with_column(Column::new(col.name().clone(), encoded))?;
        Ok(out)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::TargetEncoder {
            column: self.column.clone(),
            smoothing: self.smoothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DataFrame, Vec<i64>) {
        let df = df! {
            "city" => ["a", "a", "a", "b", "b", "c"],
        }
        .unwrap();
        (df, vec![1, 1, 0, 0, 0, 1])
    }

    #[test]
    fn test_smoothing_formula() {
        let (df, y) = sample();
        let mut t = TargetEncoderTransformer::new("city", 2.0).unwrap();
        t.fit(&df, Some(y.as_slice()), &mut Diagnostics::new()).unwrap();
        let state = t.encoding().unwrap();

        let global = 0.5;
        assert_eq!(state.global_mean, global);
        let expected_a = (3.0 * (2.0 / 3.0) + 2.0 * global) / 5.0;
        assert!((state.lookup("a").unwrap() - expected_a).abs() < 1e-12);
        let expected_b = (2.0 * 0.0 + 2.0 * global) / 4.0;
        assert!((state.lookup("b").unwrap() - expected_b).abs() < 1e-12);
    }

    #[test]
    fn test_zero_smoothing_is_raw_mean() {
        let (df, y) = sample();
        let mut t = TargetEncoderTransformer::new("city", 0.0).unwrap();
        t.fit(&df, Some(y.as_slice()), &mut Diagnostics::new()).unwrap();
        assert!((t.encoding().unwrap().lookup("a").unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_without_labels() {
        let (df, _) = sample();
        let mut t = TargetEncoderTransformer::new("city", 1.0).unwrap();
        let result = t.fit(&df, None, &mut Diagnostics::new());
        assert!(matches!(result, Err(PrepError::Argument(_))));
    }

    #[test]
    fn test_negative_smoothing_rejected() {
        assert!(matches!(
            TargetEncoderTransformer::new("city", -1.0),
            Err(PrepError::Argument(_))
        ));
        assert!(TargetEncoderTransformer::new("city", f64::NAN).is_err());
    }

    #[test]
    fn test_unseen_category_is_null() {
        let (df, y) = sample();
        let mut t = TargetEncoderTransformer::new("city", 1.0).unwrap();
        t.fit(&df, Some(y.as_slice()), &mut Diagnostics::new()).unwrap();

        let new = df! { "city" => ["a", "zzz"] }.unwrap();
        let out = t.transform(&new, &mut Diagnostics::new()).unwrap();
        let values: Vec<Option<f64>> = out.column("city").unwrap().f64().unwrap().into_iter().collect();
        assert!(values[0].is_some());
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_label_length_mismatch() {
        let (df, _) = sample();
        let mut t = TargetEncoderTransformer::new("city", 1.0).unwrap();
        let result = t.fit(&df, Some(&[1i64, 0][..]), &mut Diagnostics::new());
        assert!(matches!(result, Err(PrepError::Argument(_))));
    }
}
