//! Integration tests for the ingestion and transformation stages.
//!
//! These tests run the stages end to end against the CSV fixtures and write
//! their artifacts into temporary directories.

use mlproject_transform::utils::column_as_f64;
use mlproject_transform::{
    DataIngestion, DataTransformation, HandleUnknown, IngestionConfig, NumericImputation,
    TransformationConfig, TransformationError, Transformer, read_csv,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn transformation_in(dir: &Path) -> DataTransformation {
    let config = TransformationConfig::builder()
        .artifacts_dir(dir.join("artifacts"))
        .build()
        .unwrap();
    DataTransformation::with_config(config)
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

// ============================================================================
// Full Transformation Tests
// ============================================================================

#[test]
fn test_full_transformation_shapes() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    // 2 numeric + gender(2) + race(5) + education(6) + lunch(2) + course(2) + target
    assert_eq!(output.train_arr.shape(), (20, 20));
    assert_eq!(output.test_arr.shape(), (6, 20));
    assert_eq!(
        output.train_arr.get_column_names(),
        output.test_arr.get_column_names()
    );
}

#[test]
fn test_missing_values_are_imputed() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    for column in output.train_arr.get_columns() {
        assert_eq!(column.null_count(), 0, "nulls left in '{}'", column.name());
    }
}

#[test]
fn test_target_is_last_column_and_untransformed() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    let last = output.test_arr.get_column_names().last().map(|n| n.to_string());
    assert_eq!(last.as_deref(), Some("math_score"));

    let expected = column_as_f64(&load_csv("test.csv"), "math_score").unwrap();
    let actual = column_as_f64(&output.test_arr, "math_score").unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_numeric_features_have_unit_variance_on_train() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    let reading: Vec<f64> = column_as_f64(&output.train_arr, "num_pipeline__reading_score")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert!((population_std(&reading) - 1.0).abs() < 1e-9);

    // Scaling does not center, so every score stays positive
    assert!(reading.iter().all(|v| *v > 0.0));
}

#[test]
fn test_one_hot_columns_are_scaled_indicators() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    let female = column_as_f64(&output.train_arr, "cat_pipeline__gender_female").unwrap();
    let male = column_as_f64(&output.train_arr, "cat_pipeline__gender_male").unwrap();
    for (f, m) in female.iter().flatten().zip(male.iter().flatten()) {
        // Exactly one of the two indicators is non-zero per row
        assert!((*f == 0.0) ^ (*m == 0.0));
    }
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_preprocessor_is_saved_under_artifacts() {
    let dir = TempDir::new().unwrap();
    let transformation = transformation_in(dir.path());
    let output = transformation
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    assert_eq!(
        output.preprocessor_path,
        dir.path().join("artifacts/preprocessor.json")
    );
    assert!(output.preprocessor_path.exists());

    let loaded = DataTransformation::load_preprocessor(&output.preprocessor_path).unwrap();
    assert!(loaded.is_fitted());
    assert_eq!(loaded.n_rows_seen(), Some(20));
}

#[test]
fn test_saved_preprocessor_reproduces_test_array() {
    let dir = TempDir::new().unwrap();
    let output = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap();

    let replayed =
        DataTransformation::transform_with_saved(&output.preprocessor_path, &load_csv("test.csv"))
            .unwrap();
    let expected = output.test_arr.drop("math_score").unwrap();

    assert!(replayed.equals(&expected));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_unseen_category_is_rejected_by_default() {
    let dir = TempDir::new().unwrap();
    let err = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("unseen_category.csv"),
        )
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        TransformationError::UnknownCategory { column, category }
            if column == "race_ethnicity" && category == "group F"
    ));
    // Nothing is saved when the test split fails
    assert!(!dir.path().join("artifacts/preprocessor.json").exists());
}

#[test]
fn test_unseen_category_is_zeroed_when_ignored() {
    let dir = TempDir::new().unwrap();
    let config = TransformationConfig::builder()
        .artifacts_dir(dir.path().join("artifacts"))
        .handle_unknown(HandleUnknown::Ignore)
        .build()
        .unwrap();
    let output = DataTransformation::with_config(config)
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("unseen_category.csv"),
        )
        .unwrap();

    let race_columns: Vec<String> = output
        .test_arr
        .get_column_names()
        .iter()
        .filter(|n| n.starts_with("cat_pipeline__race_ethnicity_"))
        .map(|n| n.to_string())
        .collect();
    assert_eq!(race_columns.len(), 5);

    for name in &race_columns {
        let values = column_as_f64(&output.test_arr, name).unwrap();
        assert_eq!(values[0], Some(0.0), "'{}' should be zero for group F", name);
    }
}

#[test]
fn test_missing_target_column() {
    let dir = TempDir::new().unwrap();
    let config = TransformationConfig::builder()
        .artifacts_dir(dir.path().join("artifacts"))
        .target_column("science_score")
        .build()
        .unwrap();
    let err = DataTransformation::with_config(config)
        .initiate_data_transformation(
            fixtures_path().join("train.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        TransformationError::ColumnNotFound(c) if c == "science_score"
    ));
    assert!(err.to_string().contains("Data transformation failed"));
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let err = transformation_in(dir.path())
        .initiate_data_transformation(
            fixtures_path().join("does_not_exist.csv"),
            fixtures_path().join("test.csv"),
        )
        .unwrap_err();

    assert_eq!(err.root_cause().error_code(), "FILE_NOT_FOUND");
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[test]
fn test_ingestion_then_transformation() {
    let dir = TempDir::new().unwrap();
    let artifacts = dir.path().join("artifacts");

    let ingestion_config = IngestionConfig::builder()
        .artifacts_dir(&artifacts)
        .build()
        .unwrap();
    let split = DataIngestion::with_config(ingestion_config)
        .initiate_data_ingestion(fixtures_path().join("students.csv"))
        .unwrap();

    assert_eq!(read_csv(&split.train_path).unwrap().height(), 32);
    assert_eq!(read_csv(&split.test_path).unwrap().height(), 8);

    let config = TransformationConfig::builder()
        .artifacts_dir(&artifacts)
        .numeric_imputation(NumericImputation::Mean)
        .handle_unknown(HandleUnknown::Ignore)
        .build()
        .unwrap();
    let output = DataTransformation::with_config(config)
        .initiate_data_transformation(&split.train_path, &split.test_path)
        .unwrap();

    let preprocessor = DataTransformation::load_preprocessor(&output.preprocessor_path).unwrap();
    let n_features = preprocessor.n_features_out().unwrap();
    assert_eq!(output.train_arr.shape(), (32, n_features + 1));
    assert_eq!(output.test_arr.shape(), (8, n_features + 1));
}
