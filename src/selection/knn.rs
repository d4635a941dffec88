//! K-nearest-neighbor classification over dense feature matrices

use faer::Mat;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PrepError, Result};
use crate::transform::stats::numeric_matrix;
use crate::transform::NeighborWeights;

/// Anything that can learn from a feature matrix and predict class labels
pub trait Classifier: fmt::Debug + Send + Sync {
    fn fit(&mut self, x: &Mat<f64>, y: &[i64]) -> Result<()>;

    fn predict(&self, x: &Mat<f64>) -> Result<Vec<i64>>;
}

/// Convert every column of a transformed frame into a feature matrix.
///
/// All columns must be numeric and free of missing values.
pub fn feature_matrix(df: &DataFrame) -> Result<Mat<f64>> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let m = numeric_matrix(df, &columns, "feature_matrix")?;

    for j in 0..m.ncols() {
        if (0..m.nrows()).any(|i| m[(i, j)].is_nan()) {
            return Err(PrepError::argument(format!(
                "feature column '{}' has missing values; impute before classifying",
                columns[j]
            )));
        }
    }
    Ok(m)
}

/// Reorder `df` to the columns of `reference`.
///
/// One-hot expansion is stateless, so a test split can lack an indicator
/// the training split produced (or carry one it did not). Indicators absent
/// from `df` become all-zero columns; columns unknown to `reference` are
/// dropped.
pub fn align_features(df: &DataFrame, reference: &DataFrame) -> Result<DataFrame> {
    let columns: Vec<Column> = reference
        .get_columns()
        .iter()
        .map(|col| match df.column(col.name()) {
            Ok(present) => present.clone(),
            Err(_) => Column::new(col.name().clone(), vec![0i64; df.height()]),
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Rows of `x` at the given positions
pub(crate) fn select_rows(x: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    Mat::from_fn(rows.len(), x.ncols(), |i, j| x[(rows[i], j)])
}

#[derive(Debug, Clone)]
struct Fitted {
    x: Mat<f64>,
    y: Vec<i64>,
}

/// Euclidean KNN with uniform or inverse-distance voting.
///
/// Vote ties go to the smallest label; distance ties keep training order.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    weights: NeighborWeights,
    fitted: Option<Fitted>,
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self::with_weights(n_neighbors, NeighborWeights::Uniform)
    }

    pub fn with_weights(n_neighbors: usize, weights: NeighborWeights) -> Self {
        Self {
            n_neighbors,
            weights,
            fitted: None,
        }
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    fn fitted(&self) -> Result<&Fitted> {
        self.fitted.as_ref().ok_or(PrepError::State {
            transformer: "KnnClassifier",
        })
    }

    /// `(distance, training row)` of the k nearest training rows
    fn neighbors(&self, fitted: &Fitted, x: &Mat<f64>, row: usize) -> Vec<(f64, usize)> {
        let mut dists: Vec<(f64, usize)> = (0..fitted.x.nrows())
            .map(|t| {
                let d2: f64 = (0..x.ncols())
                    .map(|j| {
                        let diff = x[(row, j)] - fitted.x[(t, j)];
                        diff * diff
                    })
                    .sum();
                (d2.sqrt(), t)
            })
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0));
        dists.truncate(self.n_neighbors);
        dists
    }

    /// Vote weight per class among the neighbors
    fn votes(&self, fitted: &Fitted, neighbors: &[(f64, usize)]) -> BTreeMap<i64, f64> {
        let mut votes = BTreeMap::new();
        let exact = neighbors.iter().any(|(d, _)| *d == 0.0);
        for &(d, t) in neighbors {
            let w = match self.weights {
                NeighborWeights::Uniform => 1.0,
                NeighborWeights::Distance if exact => {
                    if d == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                NeighborWeights::Distance => 1.0 / d,
            };
            *votes.entry(fitted.y[t]).or_insert(0.0) += w;
        }
        votes
    }

    fn check_features(&self, fitted: &Fitted, x: &Mat<f64>) -> Result<()> {
        if x.ncols() != fitted.x.ncols() {
            return Err(PrepError::argument(format!(
                "classifier was fitted on {} features, got {}",
                fitted.x.ncols(),
                x.ncols()
            )));
        }
        Ok(())
    }

    /// Share of neighbor weight voting for class `1`, per row
    pub fn predict_scores(&self, x: &Mat<f64>) -> Result<Vec<f64>> {
        let fitted = self.fitted()?;
        self.check_features(fitted, x)?;

        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let votes = self.votes(fitted, &self.neighbors(fitted, x, i));
                let total: f64 = votes.values().sum();
                if total > 0.0 {
                    votes.get(&1).copied().unwrap_or(0.0) / total
                } else {
                    0.0
                }
            })
            .collect())
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Mat<f64>, y: &[i64]) -> Result<()> {
        if self.n_neighbors == 0 {
            return Err(PrepError::argument("n_neighbors must be at least 1"));
        }
        if x.nrows() != y.len() {
            return Err(PrepError::argument(format!(
                "got {} labels for {} rows",
                y.len(),
                x.nrows()
            )));
        }
        if self.n_neighbors > x.nrows() {
            return Err(PrepError::argument(format!(
                "n_neighbors ({}) exceeds the {} training rows",
                self.n_neighbors,
                x.nrows()
            )));
        }
        let has_nan = (0..x.nrows()).any(|i| (0..x.ncols()).any(|j| x[(i, j)].is_nan()));
        if has_nan {
            return Err(PrepError::argument("training features contain missing values"));
        }

        self.fitted = Some(Fitted {
            x: x.clone(),
            y: y.to_vec(),
        });
        Ok(())
    }

    fn predict(&self, x: &Mat<f64>) -> Result<Vec<i64>> {
        let fitted = self.fitted()?;
        self.check_features(fitted, x)?;

        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let votes = self.votes(fitted, &self.neighbors(fitted, x, i));
                // BTreeMap iterates labels ascending; strict > keeps the smallest on ties
                let mut best = (i64::MIN, f64::NEG_INFINITY);
                for (&label, &w) in &votes {
                    if w > best.1 {
                        best = (label, w);
                    }
                }
                best.0
            })
            .collect())
    }
}
