//! Stability search for a train/test split seed
//!
//! For every candidate seed the labeled dataset is split, the transformer is
//! fitted on the train side and applied to the test side, and a KNN
//! classifier reports train and test F1. The seed whose `test_f1 / train_f1`
//! ratio sits closest to the mean ratio is the most "typical" split.

use indicatif::ProgressBar;
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::knn::{align_features, feature_matrix, Classifier, KnnClassifier};
use super::metrics::f1_score;
use super::split::train_test_split;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PrepError, Result};
use crate::transform::{Transformer, TransformerConfig};
use crate::utils::progress::create_progress_bar;

const SOURCE: &str = "find_random_state";

/// Default number of seeds tried
pub const DEFAULT_TRIALS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub test_size: f64,
    pub n_neighbors: usize,
    /// Seeds whose train F1 falls below this are skipped
    pub min_train_f1: f64,
    pub show_progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            n_neighbors: 5,
            min_train_f1: 0.1,
            show_progress: false,
        }
    }
}

/// Train and test F1 for one seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeedScore {
    pub seed: u64,
    pub train_f1: f64,
    pub test_f1: f64,
}

impl SeedScore {
    pub fn ratio(&self) -> f64 {
        self.test_f1 / self.train_f1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RandomStateResult {
    /// Seed to pass back to the split
    pub seed: u64,
    /// `(seed, test_f1 / train_f1)` for every seed that was not skipped,
    /// in seed order
    pub ratios: Vec<(u64, f64)>,
    pub mean_ratio: f64,
    /// Seeds discarded by the train F1 floor
    pub skipped: Vec<u64>,
    pub scores: Vec<SeedScore>,
}

/// Split with `seed`, fit a fresh transformer on the train side and score
/// a KNN classifier on both sides.
fn run_trial(
    df: &DataFrame,
    labels: &[i64],
    template: &TransformerConfig,
    config: &SearchConfig,
    seed: u64,
    diag: &mut Diagnostics,
) -> Result<SeedScore> {
    let split = train_test_split(df, labels, config.test_size, seed)?;

    let mut stage = template.build()?;
    let x_train = stage.fit_transform(&split.x_train, Some(split.y_train.as_slice()), diag)?;
    let x_test = stage.transform(&split.x_test, diag)?;

    let train_features = feature_matrix(&x_train)?;
    let mut model = KnnClassifier::new(config.n_neighbors);
    model.fit(&train_features, &split.y_train)?;
    let train_pred = model.predict(&train_features)?;
    let test_pred = model.predict(&feature_matrix(&align_features(&x_test, &x_train)?)?)?;

    Ok(SeedScore {
        seed,
        train_f1: f1_score(&split.y_train, &train_pred),
        test_f1: f1_score(&split.y_test, &test_pred),
    })
}

/// [`find_random_state_with`] using the default [`SearchConfig`]
pub fn find_random_state(
    df: &DataFrame,
    labels: &[i64],
    transformer: &dyn Transformer,
    n: usize,
    diag: &mut Diagnostics,
) -> Result<RandomStateResult> {
    find_random_state_with(df, labels, transformer, n, &SearchConfig::default(), diag)
}

/// Score seeds `0..n` and pick the one whose ratio is nearest the mean.
///
/// `transformer` is only used as a template: each trial builds its own
/// unfitted copy from `transformer.config()`, so it is never mutated.
/// Trials run in parallel; results are ordered by seed before selection so
/// the earliest seed wins ties.
pub fn find_random_state_with(
    df: &DataFrame,
    labels: &[i64],
    transformer: &dyn Transformer,
    n: usize,
    config: &SearchConfig,
    diag: &mut Diagnostics,
) -> Result<RandomStateResult> {
    let template = transformer.config();

    let pb = if config.show_progress {
        create_progress_bar(n as u64, "   Searching seeds")
    } else {
        ProgressBar::hidden()
    };

    let trials: Vec<Result<(SeedScore, Diagnostics)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let seed = i as u64;
            let mut local = Diagnostics::new();
            let outcome = run_trial(df, labels, &template, config, seed, &mut local);
            pb.inc(1);
            outcome.map(|score| (score, local))
        })
        .collect();

    pb.finish_and_clear();

    let mut scores = Vec::with_capacity(n);
    let mut ratios = Vec::with_capacity(n);
    let mut skipped = Vec::new();

    for trial in trials {
        let (score, local) = trial?;
        diag.extend(local);

        if score.train_f1 < config.min_train_f1 {
            diag.warn(
                SOURCE,
                DiagnosticKind::SkippedSeed,
                format!(
                    "seed {} skipped: train F1 {:.3} below {}",
                    score.seed, score.train_f1, config.min_train_f1
                ),
            );
            skipped.push(score.seed);
        } else {
            ratios.push((score.seed, score.ratio()));
        }
        scores.push(score);
    }

    if ratios.is_empty() {
        return Err(PrepError::NoValidSplit {
            trials: n,
            min_train_f1: config.min_train_f1,
        });
    }

    let mean_ratio = ratios.iter().map(|(_, r)| r).sum::<f64>() / ratios.len() as f64;

    let mut best = ratios[0];
    for &(seed, ratio) in &ratios[1..] {
        if (ratio - mean_ratio).abs() < (best.1 - mean_ratio).abs() {
            best = (seed, ratio);
        }
    }

    log::info!(
        "selected seed {} (ratio {:.4}, mean {:.4}, {} of {} seeds skipped)",
        best.0,
        best.1,
        mean_ratio,
        skipped.len(),
        n
    );

    Ok(RandomStateResult {
        seed: best.0,
        ratios,
        mean_ratio,
        skipped,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::transform::{Fence, TukeyTransformer};
    use polars::prelude::*;

    fn data() -> (DataFrame, Vec<i64>) {
        let x: Vec<f64> = (0..40).map(|i| i as f64 + if i % 7 == 0 { 3.0 } else { 0.0 }).collect();
        let y: Vec<i64> = (0..40).map(|i| i64::from(i >= 20)).collect();
        (df! { "x" => x }.unwrap(), y)
    }

    #[test]
    fn test_zero_trials_is_no_valid_split() {
        let (df, y) = data();
        let t = TukeyTransformer::new("x", Fence::Outer);
        let result = find_random_state(&df, &y, &t, 0, &mut Diagnostics::new());
        assert!(matches!(result, Err(PrepError::NoValidSplit { trials: 0, .. })));
    }

    #[test]
    fn test_selected_seed_is_a_real_seed() {
        let (df, y) = data();
        let t = Pipeline::new()
            .with_stage("x", TukeyTransformer::new("x", Fence::Outer))
            .unwrap();
        let result = find_random_state(&df, &y, &t, 12, &mut Diagnostics::new()).unwrap();

        assert!(result.ratios.iter().any(|(s, _)| *s == result.seed));
        assert_eq!(result.ratios.len() + result.skipped.len(), 12);
        let seeds: Vec<u64> = result.ratios.iter().map(|(s, _)| *s).collect();
        let mut sorted = seeds.clone();
        sorted.sort();
        assert_eq!(seeds, sorted);
    }

    #[test]
    fn test_deterministic() {
        let (df, y) = data();
        let t = TukeyTransformer::new("x", Fence::Inner);
        let a = find_random_state(&df, &y, &t, 8, &mut Diagnostics::new()).unwrap();
        let b = find_random_state(&df, &y, &t, 8, &mut Diagnostics::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_seeds_skipped() {
        let (df, y) = data();
        let t = TukeyTransformer::new("x", Fence::Outer);
        let config = SearchConfig {
            min_train_f1: 1.5,
            ..SearchConfig::default()
        };
        let mut diag = Diagnostics::new();
        let result = find_random_state_with(&df, &y, &t, 3, &config, &mut diag);
        assert!(matches!(result, Err(PrepError::NoValidSplit { trials: 3, .. })));
        assert_eq!(diag.of_kind(DiagnosticKind::SkippedSeed).count(), 3);
    }
}
