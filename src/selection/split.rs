//! Stratified train/test splitting and cross-validation folds

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use crate::error::{PrepError, Result};

/// Row positions of one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// A split dataset with its labels
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Vec<i64>,
    pub y_test: Vec<i64>,
}

/// Row positions grouped by class, classes in ascending order
fn group_by_class(labels: &[i64]) -> BTreeMap<i64, Vec<usize>> {
    let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &y) in labels.iter().enumerate() {
        classes.entry(y).or_default().push(i);
    }
    classes
}

/// Split `n_take` across classes in proportion to their size, handing the
/// leftover units to the largest fractional remainders. A class rounded
/// down to zero (or up to all of its rows) borrows one unit from another
/// class when one can spare it.
fn allocate(counts: &[usize], n_take: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| n_take as f64 * c as f64 / total as f64)
        .collect();
    let mut taken: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });

    let mut leftover = n_take.saturating_sub(taken.iter().sum());
    for &c in order.iter().cycle().take(counts.len() * 2) {
        if leftover == 0 {
            break;
        }
        if taken[c] < counts[c] {
            taken[c] += 1;
            leftover -= 1;
        }
    }

    // Every class with two or more rows keeps one on each side when the
    // other classes have room to give
    for c in 0..counts.len() {
        if taken[c] == 0 && counts[c] > 0 {
            let donor = (0..counts.len())
                .filter(|&d| taken[d] > 1)
                .max_by_key(|&d| taken[d]);
            if let Some(d) = donor {
                taken[d] -= 1;
                taken[c] += 1;
            }
        }
        if taken[c] == counts[c] && counts[c] > 1 {
            let receiver = (0..counts.len())
                .filter(|&d| taken[d] + 1 < counts[d])
                .max_by_key(|&d| counts[d] - taken[d]);
            if let Some(d) = receiver {
                taken[c] -= 1;
                taken[d] += 1;
            }
        }
    }
    taken
}

/// Draw `n_test` rows per class proportionally; everything else is train.
/// Both sides are shuffled.
pub(crate) fn stratified_partition(labels: &[i64], n_test: usize, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);
    let classes = group_by_class(labels);
    let counts: Vec<usize> = classes.values().map(Vec::len).collect();
    let per_class = allocate(&counts, n_test);

    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::with_capacity(n_test);
    for (members, &k) in classes.into_values().zip(per_class.iter()) {
        let mut members = members;
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..k]);
        train.extend_from_slice(&members[k..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    SplitIndices { train, test }
}

/// Stratified, shuffled split of row positions.
///
/// The test side holds `ceil(test_size * n)` rows. Every class needs at
/// least two members, and both sides must be able to hold one row of each
/// class.
pub fn stratified_split_indices(labels: &[i64], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PrepError::argument(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n = labels.len();
    let classes = group_by_class(labels);
    if let Some((class, members)) = classes.iter().find(|(_, m)| m.len() < 2) {
        return Err(PrepError::argument(format!(
            "class {} has {} member(s); stratified splitting needs at least 2",
            class,
            members.len()
        )));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_test < classes.len() || n_train < classes.len() {
        return Err(PrepError::argument(format!(
            "a split of {} train / {} test rows cannot hold all {} classes",
            n_train,
            n_test,
            classes.len()
        )));
    }

    Ok(stratified_partition(labels, n_test, seed))
}

/// Positions of the rows in each of `k` stratified folds.
///
/// Each class is shuffled and dealt round-robin, so fold sizes differ by at
/// most one per class.
pub fn stratified_kfold(labels: &[i64], k: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(PrepError::argument(format!("need at least 2 folds, got {}", k)));
    }
    if labels.len() < k {
        return Err(PrepError::argument(format!(
            "cannot make {} folds from {} rows",
            k,
            labels.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k];
    let mut next = 0;
    for members in group_by_class(labels).into_values() {
        let mut members = members;
        members.shuffle(&mut rng);
        for i in members {
            folds[next % k].push(i);
            next += 1;
        }
    }
    Ok(folds)
}

/// Rows of `df` at the given positions, in that order
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        rows.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Stratified, shuffled train/test split of a labeled dataset
pub fn train_test_split(
    df: &DataFrame,
    labels: &[i64],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if labels.len() != df.height() {
        return Err(PrepError::argument(format!(
            "got {} labels for {} rows",
            labels.len(),
            df.height()
        )));
    }

    let split = stratified_split_indices(labels, test_size, seed)?;
    Ok(TrainTestSplit {
        x_train: take_rows(df, &split.train)?,
        x_test: take_rows(df, &split.test)?,
        y_train: split.train.iter().map(|&i| labels[i]).collect(),
        y_test: split.test.iter().map(|&i| labels[i]).collect(),
    })
}
