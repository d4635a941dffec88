//! Common test utilities and fixtures

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

const PORTS: [&str; 4] = ["Southampton", "Cherbourg", "Queenstown", "Belfast"];
const CLASSES: [&str; 4] = ["C1", "C2", "C3", "Crew"];

/// Survival outcome for a passenger row: women mostly survive, men mostly don't
fn survived(i: usize) -> i64 {
    let female = i % 2 == 0;
    match (female, i % 10) {
        (true, 4) => 0,
        (true, _) => 1,
        (false, 1) => 1,
        (false, _) => 0,
    }
}

/// Titanic-style passengers with a binary `Survived` target and one extreme fare
pub fn create_titanic_dataframe() -> DataFrame {
    let n = 40;
    let gender: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "Female" } else { "Male" }).collect();
    let class: Vec<&str> = (0..n).map(|i| CLASSES[(i / 2) % 4]).collect();
    let joined: Vec<&str> = (0..n).map(|i| PORTS[(i / 3) % 4]).collect();
    let target: Vec<i64> = (0..n).map(survived).collect();
    let fare: Vec<f64> = (0..n)
        .map(|i| match (i, target[i]) {
            (39, _) => 500.0,
            (_, 1) => 50.0 + i as f64,
            _ => 10.0 + (i % 7) as f64,
        })
        .collect();

    df! {
        "Gender" => gender,
        "Class" => class,
        "Joined" => joined,
        "Fare" => fare,
        "Survived" => target,
    }
    .unwrap()
}

/// Labels of [`create_titanic_dataframe`]
pub fn titanic_labels() -> Vec<i64> {
    (0..40).map(survived).collect()
}

/// Titanic features without the target column
pub fn titanic_features() -> DataFrame {
    create_titanic_dataframe().drop("Survived").unwrap()
}

/// Customer-style records with an ID column, categorical fields and a
/// string target ("churn" / "stay")
pub fn create_customer_dataframe() -> DataFrame {
    let n = 30;
    let levels = ["low", "medium", "high"];
    let os = ["Windows", "MacOS", "Linux"];
    let isp = ["Comcast", "Verizon"];

    let id: Vec<i64> = (1..=n as i64).collect();
    let gender: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Female" } else { "Male" }).collect();
    let level: Vec<&str> = (0..n).map(|i| levels[i % 3]).collect();
    let os_col: Vec<&str> = (0..n).map(|i| os[(i / 2) % 3]).collect();
    let isp_col: Vec<&str> = (0..n).map(|i| isp[i % 2]).collect();
    let time_spent: Vec<f64> = (0..n)
        .map(|i| if i == 7 { 900.0 } else { 20.0 + (i % 9) as f64 * 2.5 })
        .collect();
    let outcome: Vec<&str> = (0..n).map(|i| if i % 3 == 2 { "churn" } else { "stay" }).collect();

    df! {
        "ID" => id,
        "Gender" => gender,
        "Experience Level" => level,
        "OS" => os_col,
        "ISP" => isp_col,
        "Time Spent" => time_spent,
        "Outcome" => outcome,
    }
    .unwrap()
}

/// Two well separated Gaussian blobs in two features.
/// Returns the feature frame and its 0/1 labels.
pub fn create_blobs(n_per_class: usize, seed: u64) -> (DataFrame, Vec<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x1 = Vec::with_capacity(2 * n_per_class);
    let mut x2 = Vec::with_capacity(2 * n_per_class);
    let mut labels = Vec::with_capacity(2 * n_per_class);

    for i in 0..2 * n_per_class {
        let label = (i % 2) as i64;
        let center = if label == 1 { 5.0 } else { 0.0 };
        x1.push(center + rng.gen_range(-1.0..1.0));
        x2.push(center + rng.gen_range(-1.0..1.0));
        labels.push(label);
    }

    let df = df! {
        "x1" => x1,
        "x2" => x2,
    }
    .unwrap();
    (df, labels)
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Float values of a column, nulls as NaN
pub fn f64_values(df: &DataFrame, column: &str) -> Vec<f64> {
    df.column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}
