//! Selection module - splitting, classification and search helpers

pub mod grid;
pub mod halving;
pub mod knn;
pub mod metrics;
pub mod random_state;
pub mod split;
pub mod threshold;

pub use grid::{cmp_optional, expand_grid, format_params, sort_grid, ParamGrid, ParamSet, ParamValue};
pub use halving::{halving_search, HalvingConfig, HalvingResult, KnnTuner, Scoring, Trial, Tunable, CV_FOLDS};
pub use knn::{align_features, feature_matrix, Classifier, KnnClassifier};
pub use metrics::{accuracy, f1_score, precision, recall, roc_auc, Confusion};
pub use random_state::*;
pub use split::{stratified_kfold, stratified_split_indices, take_rows, train_test_split, SplitIndices, TrainTestSplit};
pub use threshold::*;
