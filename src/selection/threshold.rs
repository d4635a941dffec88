//! Metrics across a sweep of decision thresholds

use polars::prelude::*;
use serde::Serialize;

use super::metrics::{roc_auc, Confusion};
use crate::error::{PrepError, Result};

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Scores at one threshold, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRow {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub auc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdTable {
    rows: Vec<ThresholdRow>,
}

impl ThresholdTable {
    pub fn rows(&self) -> &[ThresholdRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the highest F1; the earliest threshold wins ties
    pub fn best_f1(&self) -> Option<&ThresholdRow> {
        self.rows
            .iter()
            .fold(None, |best: Option<&ThresholdRow>, row| match best {
                Some(b) if b.f1 >= row.f1 => Some(b),
                _ => Some(row),
            })
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let column = |name: &str, f: fn(&ThresholdRow) -> f64| {
            Column::new(name.into(), self.rows.iter().map(f).collect::<Vec<f64>>())
        };
        Ok(DataFrame::new(vec![
            column("threshold", |r| r.threshold),
            column("precision", |r| r.precision),
            column("recall", |r| r.recall),
            column("f1", |r| r.f1),
            column("accuracy", |r| r.accuracy),
            column("auc", |r| r.auc),
        ])?)
    }
}

/// Precision, recall, F1 and accuracy at each threshold, predicting `1`
/// when `score >= threshold`. AUC is computed once from the full scores
/// and repeated on every row.
pub fn threshold_sweep(actual: &[i64], scores: &[f64], thresholds: &[f64]) -> Result<ThresholdTable> {
    if actual.len() != scores.len() {
        return Err(PrepError::argument(format!(
            "got {} labels for {} scores",
            actual.len(),
            scores.len()
        )));
    }

    let auc = round2(roc_auc(actual, scores));
    let rows = thresholds
        .iter()
        .map(|&t| {
            let predicted: Vec<i64> = scores.iter().map(|&s| i64::from(s >= t)).collect();
            let c = Confusion::from_labels(actual, &predicted);
            ThresholdRow {
                threshold: round2(t),
                precision: round2(c.precision()),
                recall: round2(c.recall()),
                f1: round2(c.f1()),
                accuracy: round2(c.accuracy()),
                auc,
            }
        })
        .collect();

    Ok(ThresholdTable { rows })
}

/// `0.0, step, 2*step, ... <= 1.0`
pub fn default_thresholds(step: f64) -> Vec<f64> {
    if !(step > 0.0) {
        return vec![0.5];
    }
    let n = (1.0 / step).floor() as usize;
    (0..=n).map(|i| round2(i as f64 * step)).collect()
}
