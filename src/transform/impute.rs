//! KNN-based imputation of missing numeric values

use faer::Mat;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::stats::numeric_matrix;
use super::{Transformer, TransformerConfig};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PrepError, Result};

const NAME: &str = "KnnImputerTransformer";

/// How donor values are averaged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborWeights {
    /// Plain mean of the donors
    #[default]
    Uniform,
    /// Inverse-distance weighted mean; exact matches take all the weight
    Distance,
}

impl fmt::Display for NeighborWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborWeights::Uniform => write!(f, "uniform"),
            NeighborWeights::Distance => write!(f, "distance"),
        }
    }
}

impl std::str::FromStr for NeighborWeights {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(NeighborWeights::Uniform),
            "distance" => Ok(NeighborWeights::Distance),
            _ => Err(PrepError::argument(format!(
                "weights must be 'uniform' or 'distance', got '{}'",
                s
            ))),
        }
    }
}

/// Training rows kept for neighbor search
#[derive(Debug, Clone)]
struct ImputerState {
    columns: Vec<String>,
    data: Mat<f64>,
    /// Per-column mean of the present values, NaN when the column was empty
    means: Vec<f64>,
}

/// Fills missing numeric cells from the `n_neighbors` nearest training rows.
///
/// Distances are NaN-aware Euclidean: only coordinates present in both rows
/// count, and the squared sum is rescaled by `n_features / n_present`.
/// Donors for a feature are training rows where that feature is present;
/// with no donor at all the fit-time column mean is used.
///
/// Returns the same columns (as Float64) and the same rows as the input;
/// only missing cells change.
#[derive(Debug, Clone)]
pub struct KnnImputerTransformer {
    n_neighbors: usize,
    weights: NeighborWeights,
    state: Option<ImputerState>,
}

impl KnnImputerTransformer {
    pub fn new(n_neighbors: usize, weights: NeighborWeights) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(PrepError::argument(format!(
                "{} n_neighbors must be at least 1",
                NAME
            )));
        }
        Ok(Self {
            n_neighbors,
            weights,
            state: None,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    pub fn weights(&self) -> NeighborWeights {
        self.weights
    }

    fn impute_value(&self, state: &ImputerState, row: &[f64], feature: usize) -> f64 {
        let data = &state.data;

        let mut donors: Vec<(f64, f64)> = (0..data.nrows())
            .filter(|&i| !data[(i, feature)].is_nan())
            .filter_map(|i| {
                let d = nan_euclidean(row, data, i);
                d.is_finite().then(|| (d, data[(i, feature)]))
            })
            .collect();

        if donors.is_empty() {
            return state.means[feature];
        }

        // Stable sort keeps training order among equal distances
        donors.sort_by(|a, b| a.0.total_cmp(&b.0));
        donors.truncate(self.n_neighbors);

        match self.weights {
            NeighborWeights::Uniform => {
                donors.iter().map(|(_, v)| v).sum::<f64>() / donors.len() as f64
            }
            NeighborWeights::Distance => {
                let exact: Vec<f64> = donors
                    .iter()
                    .filter(|(d, _)| *d == 0.0)
                    .map(|(_, v)| *v)
                    .collect();
                if !exact.is_empty() {
                    return exact.iter().sum::<f64>() / exact.len() as f64;
                }
                let weight_sum: f64 = donors.iter().map(|(d, _)| 1.0 / d).sum();
                donors.iter().map(|(d, v)| v / d).sum::<f64>() / weight_sum
            }
        }
    }
}

/// Distance between `row` and training row `i`, ignoring missing coordinates
fn nan_euclidean(row: &[f64], data: &Mat<f64>, i: usize) -> f64 {
    let n_features = row.len();
    let mut present = 0usize;
    let mut accum = 0.0;

    for (j, &a) in row.iter().enumerate() {
        let b = data[(i, j)];
        if a.is_nan() || b.is_nan() {
            continue;
        }
        present += 1;
        accum += (a - b) * (a - b);
    }

    if present == 0 {
        return f64::INFINITY;
    }
    (accum * n_features as f64 / present as f64).sqrt()
}

impl Transformer for KnnImputerTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, df: &DataFrame, _labels: Option<&[i64]>, diag: &mut Diagnostics) -> Result<()> {
        if self.n_neighbors > df.height() {
            diag.warn(
                NAME,
                DiagnosticKind::NeighborsExceedRows,
                format!(
                    "n_neighbors ({}) exceeds the {} rows available to fit",
                    self.n_neighbors,
                    df.height()
                ),
            );
        }

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let data = numeric_matrix(df, &columns, NAME)?;

        let means = (0..data.ncols())
            .map(|j| {
                let present: Vec<f64> = (0..data.nrows())
                    .map(|i| data[(i, j)])
                    .filter(|v| !v.is_nan())
                    .collect();
                if present.is_empty() {
                    f64::NAN
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                }
            })
            .collect();

        self.state = Some(ImputerState {
            columns,
            data,
            means,
        });
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let state = self
            .state
            .as_ref()
            .ok_or(PrepError::State { transformer: NAME })?;

        let missing: Vec<String> = state
            .columns
            .iter()
            .filter(|name| df.column(name.as_str()).is_err())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PrepError::Schema {
                transformer: NAME,
                columns: missing,
            });
        }

        let input = numeric_matrix(df, &state.columns, NAME)?;
        let mut output = input.clone();
        let mut row = vec![0.0; input.ncols()];

        for i in 0..input.nrows() {
            for (j, slot) in row.iter_mut().enumerate() {
                *slot = input[(i, j)];
            }
            if !row.iter().any(|v| v.is_nan()) {
                continue;
            }
            for j in 0..row.len() {
                if row[j].is_nan() {
                    output[(i, j)] = self.impute_value(state, &row, j);
                }
            }
        }

        let mut out = df.clone();
        for (j, name) in state.columns.iter().enumerate() {
            let values: Vec<Option<f64>> = (0..output.nrows())
                .map(|i| {
                    let v = output[(i, j)];
                    (!v.is_nan()).then_some(v)
                })
                .collect();
            out.with_column(Column::new(name.as_str().into(), values))?;
        }
        Ok(out)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::KnnImputer {
            n_neighbors: self.n_neighbors,
            weights: self.weights,
        }
    }
}
