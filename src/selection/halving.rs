//! Successive-halving hyperparameter search
//!
//! Every round scores all surviving candidates with stratified 5-fold cross
//! validation on a stratified subsample, keeps the best `ceil(n / factor)`
//! and multiplies the sample budget by `factor`. The first budget is chosen
//! so the final round uses as much of the data as possible. The winner is
//! refit on the full data.

use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::grid::{expand_grid, format_params, sort_grid, ParamGrid, ParamSet, ParamValue};
use super::knn::{select_rows, Classifier, KnnClassifier};
use super::metrics::Confusion;
use super::split::{stratified_kfold, stratified_partition};
use crate::error::{PrepError, Result};
use crate::transform::NeighborWeights;

/// Cross-validation folds per candidate
pub const CV_FOLDS: usize = 5;

/// Metric maximized by the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    #[default]
    F1,
    Accuracy,
    Precision,
    Recall,
}

impl Scoring {
    pub fn score(&self, actual: &[i64], predicted: &[i64]) -> f64 {
        let c = Confusion::from_labels(actual, predicted);
        match self {
            Scoring::F1 => c.f1(),
            Scoring::Accuracy => c.accuracy(),
            Scoring::Precision => c.precision(),
            Scoring::Recall => c.recall(),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::F1 => write!(f, "f1"),
            Scoring::Accuracy => write!(f, "accuracy"),
            Scoring::Precision => write!(f, "precision"),
            Scoring::Recall => write!(f, "recall"),
        }
    }
}

impl std::str::FromStr for Scoring {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "f1" => Ok(Scoring::F1),
            "accuracy" => Ok(Scoring::Accuracy),
            "precision" => Ok(Scoring::Precision),
            "recall" => Ok(Scoring::Recall),
            _ => Err(PrepError::argument(format!(
                "unknown scoring '{}', expected f1, accuracy, precision or recall",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalvingConfig {
    /// Survivors per round are `ceil(n / factor)`; budgets grow by `factor`
    pub factor: usize,
    pub scoring: Scoring,
    /// Seed for subsampling and fold assignment
    pub random_state: u64,
}

impl Default for HalvingConfig {
    fn default() -> Self {
        Self {
            factor: 3,
            scoring: Scoring::F1,
            random_state: 0,
        }
    }
}

/// Builds an unfitted estimator from one point of the grid
pub trait Tunable: Send + Sync {
    fn build(&self, params: &ParamSet) -> Result<Box<dyn Classifier>>;
}

/// Tunes [`KnnClassifier`] over `n_neighbors` (int) and `weights`
/// (`uniform` or `distance`). `None` leaves the default (5, uniform).
#[derive(Debug, Clone, Copy, Default)]
pub struct KnnTuner;

impl Tunable for KnnTuner {
    fn build(&self, params: &ParamSet) -> Result<Box<dyn Classifier>> {
        let mut n_neighbors = 5;
        let mut weights = NeighborWeights::Uniform;

        for (key, value) in params {
            match (key.as_str(), value) {
                (_, None) => {}
                ("n_neighbors", Some(ParamValue::Int(k))) if *k > 0 => n_neighbors = *k as usize,
                ("weights", Some(ParamValue::Str(w))) => weights = w.parse()?,
                (key, Some(value)) => {
                    return Err(PrepError::argument(format!(
                        "KnnTuner cannot use {}={}",
                        key, value
                    )))
                }
            }
        }
        Ok(Box::new(KnnClassifier::with_weights(n_neighbors, weights)))
    }
}

/// One candidate scored in one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub iteration: usize,
    pub n_resources: usize,
    pub params: ParamSet,
    /// Mean CV score; NaN when the estimator failed on some fold
    pub mean_score: f64,
}

#[derive(Debug)]
pub struct HalvingResult {
    pub best_params: ParamSet,
    pub best_score: f64,
    /// Best candidate refit on all rows
    pub best_estimator: Box<dyn Classifier>,
    pub history: Vec<Trial>,
}

/// `1 + floor(log_factor(n))`
fn log_steps(n: usize, factor: usize) -> usize {
    let mut steps = 1;
    let mut rest = n;
    while rest >= factor {
        rest /= factor;
        steps += 1;
    }
    steps
}

fn cross_validate(
    tuner: &dyn Tunable,
    params: &ParamSet,
    x: &Mat<f64>,
    y: &[i64],
    folds: &[Vec<usize>],
    scoring: Scoring,
) -> Result<f64> {
    let mut total = 0.0;
    for (k, test_rows) in folds.iter().enumerate() {
        let held_out: BTreeSet<usize> = test_rows.iter().copied().collect();
        let train_rows: Vec<usize> = (0..y.len()).filter(|i| !held_out.contains(i)).collect();

        let mut model = tuner.build(params)?;
        let y_train: Vec<i64> = train_rows.iter().map(|&i| y[i]).collect();
        let y_test: Vec<i64> = test_rows.iter().map(|&i| y[i]).collect();

        let fold_score = model
            .fit(&select_rows(x, &train_rows), &y_train)
            .and_then(|_| model.predict(&select_rows(x, test_rows)))
            .map(|predicted| scoring.score(&y_test, &predicted));

        match fold_score {
            Ok(score) => total += score,
            Err(e) => {
                log::debug!("{} failed on fold {}: {}", format_params(params), k, e);
                return Ok(f64::NAN);
            }
        }
    }
    Ok(total / folds.len() as f64)
}

/// Run successive halving over every combination of `grid`.
///
/// Parameter errors (a value the tuner cannot use) fail the search; an
/// estimator that fails while fitting a fold scores NaN and ranks last.
pub fn halving_search(
    tuner: &dyn Tunable,
    x: &Mat<f64>,
    y: &[i64],
    grid: &ParamGrid,
    config: &HalvingConfig,
) -> Result<HalvingResult> {
    if config.factor < 2 {
        return Err(PrepError::argument(format!(
            "halving factor must be at least 2, got {}",
            config.factor
        )));
    }
    if x.nrows() != y.len() {
        return Err(PrepError::argument(format!(
            "got {} labels for {} rows",
            y.len(),
            x.nrows()
        )));
    }

    let mut candidates = expand_grid(&sort_grid(grid.clone()));
    if candidates.is_empty() {
        return Err(PrepError::argument("parameter grid has no candidates"));
    }
    for params in &candidates {
        tuner.build(params)?;
    }

    let n = y.len();
    let n_classes = y.iter().collect::<BTreeSet<_>>().len();
    let floor = 2 * CV_FOLDS * n_classes;

    let required = log_steps(candidates.len(), config.factor);
    let min_resources = (n / config.factor.pow((required - 1) as u32)).max(floor);
    if min_resources > n {
        return Err(PrepError::argument(format!(
            "{} rows are too few for {}-fold CV over {} classes",
            n, CV_FOLDS, n_classes
        )));
    }
    let iterations = required.min(log_steps(n / min_resources, config.factor));

    log::info!(
        "halving search: {} candidates, {} rounds, {} to {} samples",
        candidates.len(),
        iterations,
        min_resources,
        n
    );

    let mut history = Vec::new();
    let mut last_round: Vec<(ParamSet, f64)> = Vec::new();

    for iteration in 0..iterations {
        let n_resources = (min_resources * config.factor.pow(iteration as u32)).min(n);
        let seed = config.random_state.wrapping_add(iteration as u64);

        let rows: Vec<usize> = if n_resources < n {
            stratified_partition(y, n_resources, seed).test
        } else {
            (0..n).collect()
        };
        let x_sub = select_rows(x, &rows);
        let y_sub: Vec<i64> = rows.iter().map(|&i| y[i]).collect();
        let folds = stratified_kfold(&y_sub, CV_FOLDS, seed)?;

        let scores: Vec<Result<f64>> = candidates
            .par_iter()
            .map(|params| cross_validate(tuner, params, &x_sub, &y_sub, &folds, config.scoring))
            .collect();

        let mut scored = Vec::with_capacity(candidates.len());
        for (params, score) in candidates.into_iter().zip(scores) {
            let score = score?;
            history.push(Trial {
                iteration,
                n_resources,
                params: params.clone(),
                mean_score: score,
            });
            scored.push((params, score));
        }

        // Descending by score, NaN last; stable so grid order breaks ties
        scored.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (false, false) => b.1.total_cmp(&a.1),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });

        let keep = scored.len().div_ceil(config.factor);
        candidates = scored.iter().take(keep).map(|(p, _)| p.clone()).collect();
        last_round = scored;
    }

    let (best_params, best_score) = last_round
        .into_iter()
        .next()
        .ok_or_else(|| PrepError::argument("halving search ran no rounds"))?;

    let mut best_estimator = tuner.build(&best_params)?;
    best_estimator.fit(x, y)?;

    log::info!(
        "halving search best {} {}={:.4}",
        format_params(&best_params),
        config.scoring,
        best_score
    );

    Ok(HalvingResult {
        best_params,
        best_score,
        best_estimator,
        history,
    })
}
