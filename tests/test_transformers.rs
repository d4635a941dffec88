//! Integration tests for the individual column transformers

use polars::prelude::*;
use prepkit::transform::*;
use prepkit::{DiagnosticKind, Diagnostics, PrepError};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_tukey_outer_clips_only_the_outlier() {
    let df = df! {
        "Age" => [10.0f64, 12.0, 14.0, 15.0, 200.0],
    }
    .unwrap();

    let mut t = TukeyTransformer::new("Age", Fence::Outer);
    let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();

    assert_eq!(out.height(), 5, "Clipping must never drop rows");
    assert_eq!(f64_values(&out, "Age"), vec![10.0, 12.0, 14.0, 15.0, 24.0]);
}

#[test]
fn test_clipping_is_idempotent() {
    let df = titanic_features();
    let mut sigma = Sigma3Transformer::new("Fare");
    let mut tukey = TukeyTransformer::new("Fare", Fence::Inner);

    let stages: [&mut dyn Transformer; 2] = [&mut sigma, &mut tukey];
    for t in stages {
        let mut diag = Diagnostics::new();
        let once = t.fit_transform(&df, None, &mut diag).unwrap();
        let twice = t.transform(&once, &mut diag).unwrap();
        assert_eq!(
            f64_values(&once, "Fare"),
            f64_values(&twice, "Fare"),
            "{} should be idempotent once fitted",
            t.name()
        );
    }
}

#[test]
fn test_mapping_passes_unmapped_values_through() {
    let df = df! {
        "Gender" => ["Male", "Female", "Unknown"],
    }
    .unwrap();
    let t = MappingTransformer::new("Gender", [("Male", 0i64), ("Female", 1)]);

    let mut diag = Diagnostics::new();
    let out = t.transform(&df, &mut diag).unwrap();

    let values: Vec<Option<String>> = out
        .column("Gender")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    assert_eq!(
        values,
        vec![Some("0".to_string()), Some("1".to_string()), Some("Unknown".to_string())]
    );
    assert!(diag.contains(DiagnosticKind::UnmappedValues));
}

#[test]
fn test_drop_absent_column_is_a_diagnostic() {
    let df = titanic_features();
    let t = DropColumnsTransformer::drop(["X"]);

    let mut diag = Diagnostics::new();
    let out = t.transform(&df, &mut diag).unwrap();

    assert!(out.equals(&df), "Frame should come back unchanged");
    assert!(diag.contains(DiagnosticKind::MissingDropColumns));
}

#[test]
fn test_keep_columns() {
    let df = titanic_features();
    let t = DropColumnsTransformer::keep(["Fare", "Gender"]);
    let out = t.transform(&df, &mut Diagnostics::new()).unwrap();

    assert_shape(&out, 40, 2);
    assert_missing_columns(&out, &["Class", "Joined"]);
}

#[test]
fn test_one_hot_indicators_sum_to_one() {
    let df = titanic_features();
    let mut t = OneHotTransformer::new("Joined");
    let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();

    let indicators = [
        "Joined_Southampton",
        "Joined_Cherbourg",
        "Joined_Queenstown",
        "Joined_Belfast",
    ];
    assert_has_columns(&out, &indicators);
    assert_missing_columns(&out, &["Joined"]);

    for row in 0..out.height() {
        let total: f64 = indicators.iter().map(|c| f64_values(&out, c)[row]).sum();
        assert_eq!(total, 1.0, "Row {} should have exactly one indicator set", row);
    }
}

#[test]
fn test_robust_scaler_recovers_original() {
    let df = titanic_features();
    let mut t = RobustScalerTransformer::new("Fare");
    let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();
    let scale = t.scale().unwrap();

    for (o, s) in f64_values(&df, "Fare").iter().zip(f64_values(&out, "Fare")) {
        assert!((s * scale.iqr + scale.median - o).abs() < 1e-9);
    }
}

#[test]
fn test_target_encoding_within_label_range() {
    let df = titanic_features();
    let labels = titanic_labels();
    let mut t = TargetEncoderTransformer::new("Class", 10.0).unwrap();

    let out = t
        .fit_transform(&df, Some(labels.as_slice()), &mut Diagnostics::new())
        .unwrap();
    for v in f64_values(&out, "Class") {
        assert!((0.0..=1.0).contains(&v), "Encoded value {} out of [0, 1]", v);
    }
}

#[test]
fn test_target_encoding_between_category_and_global_mean() {
    let df = titanic_features();
    let labels = titanic_labels();
    let mut t = TargetEncoderTransformer::new("Joined", 10.0).unwrap();
    t.fit(&df, Some(labels.as_slice()), &mut Diagnostics::new()).unwrap();
    let state = t.encoding().unwrap();

    let ports: Vec<String> = df
        .column("Joined")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect();
    let global = labels.iter().sum::<i64>() as f64 / labels.len() as f64;
    assert_eq!(state.global_mean, global);

    let mut checked = 0;
    for (category, &encoded) in &state.encoding {
        let members: Vec<i64> = ports
            .iter()
            .zip(labels.iter())
            .filter(|(c, _)| *c == category)
            .map(|(_, &y)| y)
            .collect();
        let raw = members.iter().sum::<i64>() as f64 / members.len() as f64;
        if raw == global {
            assert!((encoded - global).abs() < 1e-12);
            continue;
        }

        let (low, high) = (raw.min(global), raw.max(global));
        assert!(
            low < encoded && encoded < high,
            "Category '{}' encoded to {}, expected strictly between {} and {}",
            category,
            encoded,
            low,
            high
        );
        checked += 1;
    }
    assert!(checked > 0, "Fixture should have categories away from the global mean");
}

#[test]
fn test_clipping_keeps_missing_cells() {
    let df = df! {
        "x" => [Some(10.0f64), Some(12.0), Some(f64::NAN), None, Some(15.0), Some(200.0)],
    }
    .unwrap();
    let mut sigma = Sigma3Transformer::new("x");
    let mut tukey = TukeyTransformer::new("x", Fence::Outer);

    let stages: [&mut dyn Transformer; 2] = [&mut sigma, &mut tukey];
    for t in stages {
        let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();
        let values: Vec<Option<f64>> = out.column("x").unwrap().f64().unwrap().into_iter().collect();

        assert!(
            values[2].is_some_and(f64::is_nan),
            "{} rewrote a NaN cell to {:?}",
            t.name(),
            values[2]
        );
        assert_eq!(values[3], None, "{} filled a null cell", t.name());
        assert_eq!(values[0], Some(10.0));
    }
}

#[test]
fn test_target_encoder_requires_labels() {
    let df = titanic_features();
    let mut t = TargetEncoderTransformer::new("Class", 10.0).unwrap();
    let result = t.fit(&df, None, &mut Diagnostics::new());
    assert!(matches!(result, Err(PrepError::Argument(_))));
}

#[test]
fn test_knn_imputer_fills_every_gap() {
    let df = df! {
        "a" => [Some(1.0f64), Some(2.0), None, Some(4.0), Some(5.0)],
        "b" => [Some(10.0f64), None, Some(30.0), Some(40.0), Some(50.0)],
    }
    .unwrap();
    let mut t = KnnImputerTransformer::new(2, NeighborWeights::Uniform).unwrap();
    let out = t.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();

    assert_shape(&out, 5, 2);
    assert_eq!(out.column("a").unwrap().null_count(), 0);
    assert_eq!(out.column("b").unwrap().null_count(), 0);
    assert_eq!(f64_values(&out, "a")[0], 1.0, "Present cells must not change");
}

#[test]
fn test_stateful_transform_before_fit() {
    let df = titanic_features();
    let result = Sigma3Transformer::new("Fare").transform(&df, &mut Diagnostics::new());
    assert!(matches!(result, Err(PrepError::State { .. })));
}

#[test]
fn test_numeric_transformer_rejects_strings() {
    let df = titanic_features();
    let mut t = TukeyTransformer::new("Gender", Fence::Outer);
    let result = t.fit(&df, None, &mut Diagnostics::new());
    assert!(matches!(result, Err(PrepError::Type { .. })));
}
