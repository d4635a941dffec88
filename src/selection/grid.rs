//! Hyperparameter grids

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// One candidate hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    fn rank(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 0,
            ParamValue::Int(_) | ParamValue::Float(_) => 1,
            ParamValue::Str(_) => 2,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order: booleans, then numbers (ints and floats compared by
    /// value), then strings.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a.cmp(b),
            (ParamValue::Str(a), ParamValue::Str(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

/// `None` orders before every value
pub fn cmp_optional(a: &Option<ParamValue>, b: &Option<ParamValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(b),
    }
}

/// Candidate values per hyperparameter; `None` means "leave at default".
pub type ParamGrid = BTreeMap<String, Vec<Option<ParamValue>>>;

/// One point of a grid
pub type ParamSet = BTreeMap<String, Option<ParamValue>>;

/// New grid with keys sorted and each value list sorted ascending,
/// `None` first.
pub fn sort_grid<I>(grid: I) -> ParamGrid
where
    I: IntoIterator<Item = (String, Vec<Option<ParamValue>>)>,
{
    grid.into_iter()
        .map(|(key, mut values)| {
            values.sort_by(cmp_optional);
            (key, values)
        })
        .collect()
}

/// Every combination of the grid, keys in sorted order with the last key
/// varying fastest. A key with no values yields no combinations.
pub fn expand_grid(grid: &ParamGrid) -> Vec<ParamSet> {
    let mut combos = vec![ParamSet::new()];
    for (key, values) in grid {
        combos = combos
            .into_iter()
            .flat_map(|base| {
                values.iter().map(move |v| {
                    let mut next = base.clone();
                    next.insert(key.clone(), v.clone());
                    next
                })
            })
            .collect();
    }
    combos
}

/// `{k=v, ...}` rendering used in reports and logs
pub fn format_params(params: &ParamSet) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|(k, v)| match v {
            Some(v) => format!("{}={}", k, v),
            None => format!("{}=None", k),
        })
        .collect();
    format!("{{{}}}", parts.join(", "))
}
