//! Integration tests for pipeline composition, presets and JSON configuration

use polars::prelude::*;
use prepkit::pipeline::*;
use prepkit::transform::{Fence, MappingTransformer, TransformerConfig, TukeyTransformer};
use prepkit::{DiagnosticKind, Diagnostics, PrepError, Transformer};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_titanic_preset_produces_numeric_frame() {
    let df = titanic_features();
    let mut pipeline = titanic_transformer().unwrap();

    let mut diag = Diagnostics::new();
    let out = pipeline.fit_transform(&df, None, &mut diag).unwrap();

    assert_eq!(out.height(), 40, "Pipeline must keep every row");
    assert_has_columns(
        &out,
        &["Gender", "Class", "Fare", "Joined_Southampton", "Joined_Belfast"],
    );
    assert_missing_columns(&out, &["Joined"]);
    for col in out.get_columns() {
        assert!(
            col.dtype().is_primitive_numeric(),
            "Column '{}' should be numeric, got {}",
            col.name(),
            col.dtype()
        );
    }

    let max_fare = f64_values(&out, "Fare").into_iter().fold(f64::MIN, f64::max);
    assert!(max_fare < 500.0, "Extreme fare should be clipped, got {}", max_fare);
    assert!(diag.is_empty(), "Unexpected diagnostics: {:?}", diag.entries());
}

#[test]
fn test_customer_preset_drops_id_and_expands_categories() {
    let df = create_customer_dataframe().drop("Outcome").unwrap();
    let mut pipeline = customer_transformer().unwrap();
    let out = pipeline.fit_transform(&df, None, &mut Diagnostics::new()).unwrap();

    assert_missing_columns(&out, &["ID", "OS", "ISP"]);
    assert_has_columns(
        &out,
        &["Experience Level", "OS_Windows", "OS_Linux", "ISP_Comcast", "Time Spent"],
    );
    let levels = f64_values(&out, "Experience Level");
    assert_eq!(&levels[..3], &[0.0, 1.0, 2.0]);
}

#[test]
fn test_transform_replays_fitted_state_on_new_rows() {
    let df = titanic_features();
    let mut pipeline = titanic_transformer().unwrap();
    let mut diag = Diagnostics::new();
    pipeline.fit(&df, None, &mut diag).unwrap();

    let fresh = df! {
        "Gender" => ["Female"],
        "Class" => ["C1"],
        "Joined" => ["Cherbourg"],
        "Fare" => [10_000.0f64],
    }
    .unwrap();
    let out = pipeline.transform(&fresh, &mut diag).unwrap();

    let fitted = titanic_transformer().unwrap().fit_transform(&df, None, &mut Diagnostics::new()).unwrap();
    let fitted_max = f64_values(&fitted, "Fare").into_iter().fold(f64::MIN, f64::max);
    assert_eq!(f64_values(&out, "Fare"), vec![fitted_max], "New fare should hit the fitted fence");
}

#[test]
fn test_stage_failure_stops_the_pipeline() {
    let df = titanic_features();
    let mut pipeline = Pipeline::new()
        .with_stage("gender", MappingTransformer::new("Gender", [("Male", 0i64), ("Female", 1)]))
        .unwrap()
        .with_stage("age", TukeyTransformer::new("Age", Fence::Outer))
        .unwrap();

    let result = pipeline.fit_transform(&df, None, &mut Diagnostics::new());
    match result {
        Err(PrepError::Schema { columns, .. }) => assert_eq!(columns, vec!["Age".to_string()]),
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_duplicate_stage_name_rejected() {
    let result = Pipeline::new()
        .with_stage("fare", TukeyTransformer::new("Fare", Fence::Outer))
        .unwrap()
        .with_stage("fare", TukeyTransformer::new("Fare", Fence::Inner));
    assert!(matches!(result, Err(PrepError::Argument(_))));
}

#[test]
fn test_pipeline_from_json_config() {
    let json = r#"{
        "stages": [
            {"name": "gender", "transformer": {"kind": "mapping", "column": "Gender",
                                               "mapping": [["Male", 0], ["Female", 1]]}},
            {"name": "class", "transformer": {"kind": "target_encoder", "column": "Class"}},
            {"name": "drop", "transformer": {"kind": "drop_columns", "columns": ["Joined"]}},
            {"name": "fare", "transformer": {"kind": "robust_scaler", "column": "Fare"}}
        ]
    }"#;
    let config = PipelineConfig::from_json(json).unwrap();
    let mut pipeline = Pipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.stage_names(), vec!["gender", "class", "drop", "fare"]);

    let labels = titanic_labels();
    let out = pipeline
        .fit_transform(&titanic_features(), Some(labels.as_slice()), &mut Diagnostics::new())
        .unwrap();
    assert_shape(&out, 40, 3);
}

#[test]
fn test_config_round_trip_rebuilds_equivalent_pipeline() {
    let original = titanic_transformer().unwrap();
    let json = original.to_config().to_json().unwrap();
    let rebuilt = Pipeline::from_config(&PipelineConfig::from_json(&json).unwrap()).unwrap();

    assert_eq!(rebuilt.to_config(), original.to_config());
    assert!(matches!(original.config(), TransformerConfig::Pipeline(_)));
}

#[test]
fn test_nested_pipeline_stage() {
    let inner = titanic_transformer().unwrap();
    let mut outer = Pipeline::new();
    outer.push("titanic", Box::new(inner)).unwrap();
    outer
        .push("drop_fare", Box::new(prepkit::transform::DropColumnsTransformer::drop(["Fare"])))
        .unwrap();

    let mut diag = Diagnostics::new();
    let out = outer.fit_transform(&titanic_features(), None, &mut diag).unwrap();
    assert_missing_columns(&out, &["Fare", "Joined"]);
    assert!(!diag.contains(DiagnosticKind::MissingDropColumns));
}

#[test]
fn test_unknown_preset() {
    assert!(matches!(preset("iris"), Err(PrepError::Argument(_))));
    assert_eq!(preset("TITANIC").unwrap().len(), 4);
}
