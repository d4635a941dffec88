//! Binary classification metrics; the positive class is `1`.
//!
//! Undefined ratios (no predicted or no actual positives) score 0.

/// Confusion counts for the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl Confusion {
    pub fn from_labels(actual: &[i64], predicted: &[i64]) -> Self {
        let mut c = Confusion::default();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            match (a == 1, p == 1) {
                (true, true) => c.tp += 1,
                (false, true) => c.fp += 1,
                (false, false) => c.tn += 1,
                (true, false) => c.fn_ += 1,
            }
        }
        c
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn precision(actual: &[i64], predicted: &[i64]) -> f64 {
    Confusion::from_labels(actual, predicted).precision()
}

pub fn recall(actual: &[i64], predicted: &[i64]) -> f64 {
    Confusion::from_labels(actual, predicted).recall()
}

pub fn f1_score(actual: &[i64], predicted: &[i64]) -> f64 {
    Confusion::from_labels(actual, predicted).f1()
}

pub fn accuracy(actual: &[i64], predicted: &[i64]) -> f64 {
    Confusion::from_labels(actual, predicted).accuracy()
}

/// Area under the ROC curve via the Mann-Whitney U statistic.
///
/// Tied scores share their average rank. Returns 0.5 when either class is
/// absent.
pub fn roc_auc(actual: &[i64], scores: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(actual.iter())
        .map(|(&s, &a)| (s, a == 1))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total_pos = pairs.iter().filter(|(_, p)| *p).count() as f64;
    let total_neg = pairs.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5;
    }

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut seen = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pairs[j].0 == pairs[i].0 {
            j += 1;
        }
        let group = (j - i) as f64;
        // 1-based average rank of the tie group
        let avg_rank = seen + (group + 1.0) / 2.0;
        let pos_in_group = pairs[i..j].iter().filter(|(_, p)| *p).count() as f64;
        rank_sum_pos += avg_rank * pos_in_group;
        seen += group;
        i = j;
    }

    let u = rank_sum_pos - total_pos * (total_pos + 1.0) / 2.0;
    (u / (total_pos * total_neg)).clamp(0.0, 1.0)
}
