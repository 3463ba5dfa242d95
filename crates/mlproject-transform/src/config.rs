//! Configuration types for data ingestion and transformation.
//!
//! Both configurations use the builder pattern and are validated on `build()`.
//! Defaults describe the student exam-score dataset.

use crate::preprocessing::{FillValue, HandleUnknown, ImputeStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default directory for all generated artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default file name of the serialized preprocessor.
pub const DEFAULT_PREPROCESSOR_FILE: &str = "preprocessor.json";

/// Default prediction target.
pub const DEFAULT_TARGET_COLUMN: &str = "math_score";

/// Default numeric feature columns.
pub const DEFAULT_NUMERICAL_COLUMNS: [&str; 2] = ["writing_score", "reading_score"];

/// Default categorical feature columns.
pub const DEFAULT_CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

/// Fill value used by [`CategoricalImputation::Constant`].
pub const CONSTANT_CATEGORY: &str = "Unknown";

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NumericImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    #[default]
    Median,
}

impl From<NumericImputation> for ImputeStrategy {
    fn from(strategy: NumericImputation) -> Self {
        match strategy {
            NumericImputation::Mean => ImputeStrategy::Mean,
            NumericImputation::Median => ImputeStrategy::Median,
        }
    }
}

/// Strategy for imputing missing categorical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CategoricalImputation {
    /// Use the most frequent value
    #[default]
    MostFrequent,
    /// Use a constant value ("Unknown")
    Constant,
}

impl From<CategoricalImputation> for ImputeStrategy {
    fn from(strategy: CategoricalImputation) -> Self {
        match strategy {
            CategoricalImputation::MostFrequent => ImputeStrategy::MostFrequent,
            CategoricalImputation::Constant => {
                ImputeStrategy::Constant(FillValue::Text(CONSTANT_CATEGORY.to_string()))
            }
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column group '{0}' must contain at least one column")]
    EmptyColumnGroup(String),

    #[error("Column '{0}' is listed more than once")]
    DuplicateColumn(String),

    #[error("Target column '{0}' is also listed as a feature")]
    TargetInFeatures(String),

    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),

    #[error("File name for '{0}' must not be empty")]
    EmptyFileName(String),
}

// =============================================================================
// Transformation
// =============================================================================

/// Configuration for [`crate::DataTransformation`].
///
/// Use [`TransformationConfig::builder()`] for custom values. The defaults
/// write the fitted preprocessor to `artifacts/preprocessor.json` and treat
/// `math_score` as the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Directory the preprocessor artifact is written to.
    /// Default: "artifacts"
    pub artifacts_dir: PathBuf,

    /// File name of the serialized preprocessor inside `artifacts_dir`.
    /// Default: "preprocessor.json"
    pub preprocessor_file_name: String,

    /// Column appended back onto the transformed arrays.
    /// Default: "math_score"
    pub target_column: String,

    /// Columns fed through the numeric pipeline.
    pub numerical_columns: Vec<String>,

    /// Columns fed through the categorical pipeline.
    pub categorical_columns: Vec<String>,

    /// Default: Median
    pub numeric_imputation: NumericImputation,

    /// Default: MostFrequent
    pub categorical_imputation: CategoricalImputation,

    /// What the one-hot encoder does with categories unseen during fit.
    /// Default: Error
    pub handle_unknown: HandleUnknown,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            preprocessor_file_name: DEFAULT_PREPROCESSOR_FILE.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            numerical_columns: to_strings(&DEFAULT_NUMERICAL_COLUMNS),
            categorical_columns: to_strings(&DEFAULT_CATEGORICAL_COLUMNS),
            numeric_imputation: NumericImputation::default(),
            categorical_imputation: CategoricalImputation::default(),
            handle_unknown: HandleUnknown::default(),
        }
    }
}

impl TransformationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransformationConfigBuilder {
        TransformationConfigBuilder::default()
    }

    /// Path the fitted preprocessor is saved to.
    pub fn preprocessor_obj_file_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.preprocessor_file_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preprocessor_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFileName(
                "preprocessor_file_name".to_string(),
            ));
        }
        if self.numerical_columns.is_empty() {
            return Err(ConfigValidationError::EmptyColumnGroup(
                "numerical_columns".to_string(),
            ));
        }
        if self.categorical_columns.is_empty() {
            return Err(ConfigValidationError::EmptyColumnGroup(
                "categorical_columns".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for col in self.numerical_columns.iter().chain(&self.categorical_columns) {
            if !seen.insert(col.as_str()) {
                return Err(ConfigValidationError::DuplicateColumn(col.clone()));
            }
        }

        if seen.contains(self.target_column.as_str()) {
            return Err(ConfigValidationError::TargetInFeatures(
                self.target_column.clone(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TransformationConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct TransformationConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    preprocessor_file_name: Option<String>,
    target_column: Option<String>,
    numerical_columns: Option<Vec<String>>,
    categorical_columns: Option<Vec<String>>,
    numeric_imputation: Option<NumericImputation>,
    categorical_imputation: Option<CategoricalImputation>,
    handle_unknown: Option<HandleUnknown>,
}

impl TransformationConfigBuilder {
    /// Set the directory the preprocessor artifact is written to.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the file name of the serialized preprocessor.
    pub fn preprocessor_file_name(mut self, name: impl Into<String>) -> Self {
        self.preprocessor_file_name = Some(name.into());
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Replace the numeric feature columns.
    pub fn numerical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numerical_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the categorical feature columns.
    pub fn categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the numeric imputation strategy.
    pub fn numeric_imputation(mut self, strategy: NumericImputation) -> Self {
        self.numeric_imputation = Some(strategy);
        self
    }

    /// Set the categorical imputation strategy.
    pub fn categorical_imputation(mut self, strategy: CategoricalImputation) -> Self {
        self.categorical_imputation = Some(strategy);
        self
    }

    /// Set how unseen categories are handled during transform.
    pub fn handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `TransformationConfig` or an error if validation fails.
    pub fn build(self) -> Result<TransformationConfig, ConfigValidationError> {
        let defaults = TransformationConfig::default();
        let config = TransformationConfig {
            artifacts_dir: self.artifacts_dir.unwrap_or(defaults.artifacts_dir),
            preprocessor_file_name: self
                .preprocessor_file_name
                .unwrap_or(defaults.preprocessor_file_name),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            numerical_columns: self.numerical_columns.unwrap_or(defaults.numerical_columns),
            categorical_columns: self
                .categorical_columns
                .unwrap_or(defaults.categorical_columns),
            numeric_imputation: self.numeric_imputation.unwrap_or_default(),
            categorical_imputation: self.categorical_imputation.unwrap_or_default(),
            handle_unknown: self.handle_unknown.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Ingestion
// =============================================================================

/// Configuration for [`crate::DataIngestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Directory the raw copy and the splits are written to.
    /// Default: "artifacts"
    pub artifacts_dir: PathBuf,

    /// Default: "data.csv"
    pub raw_file_name: String,

    /// Default: "train.csv"
    pub train_file_name: String,

    /// Default: "test.csv"
    pub test_file_name: String,

    /// Fraction of rows assigned to the test split.
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the row shuffle.
    /// Default: 42
    pub seed: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            raw_file_name: "data.csv".to_string(),
            train_file_name: "train.csv".to_string(),
            test_file_name: "test.csv".to_string(),
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl IngestionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> IngestionConfigBuilder {
        IngestionConfigBuilder::default()
    }

    pub fn raw_data_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.raw_file_name)
    }

    pub fn train_data_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.train_file_name)
    }

    pub fn test_data_path(&self) -> PathBuf {
        self.artifacts_dir.join(&self.test_file_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        for (field, name) in [
            ("raw_file_name", &self.raw_file_name),
            ("train_file_name", &self.train_file_name),
            ("test_file_name", &self.test_file_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyFileName(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Builder for [`IngestionConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct IngestionConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
}

impl IngestionConfigBuilder {
    /// Set the output directory for the raw copy and the splits.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(path.into());
        self
    }

    /// Set the fraction of rows assigned to the test split.
    ///
    /// # Arguments
    /// * `fraction` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<IngestionConfig, ConfigValidationError> {
        let defaults = IngestionConfig::default();
        let config = IngestionConfig {
            artifacts_dir: self.artifacts_dir.unwrap_or(defaults.artifacts_dir),
            test_size: self.test_size.unwrap_or(defaults.test_size),
            seed: self.seed.unwrap_or(defaults.seed),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

fn to_strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransformationConfig::default();
        assert_eq!(config.target_column, "math_score");
        assert_eq!(config.numerical_columns, vec!["writing_score", "reading_score"]);
        assert_eq!(config.categorical_columns.len(), 5);
        assert_eq!(config.numeric_imputation, NumericImputation::Median);
        assert_eq!(
            config.categorical_imputation,
            CategoricalImputation::MostFrequent
        );
        assert_eq!(config.handle_unknown, HandleUnknown::Error);
    }

    #[test]
    fn test_preprocessor_obj_file_path() {
        let config = TransformationConfig::default();
        assert_eq!(
            config.preprocessor_obj_file_path(),
            PathBuf::from("artifacts").join("preprocessor.json")
        );
    }

    #[test]
    fn test_builder_custom_values() {
        let config = TransformationConfig::builder()
            .artifacts_dir("out")
            .target_column("reading_score")
            .numerical_columns(["writing_score"])
            .categorical_columns(["gender", "lunch"])
            .numeric_imputation(NumericImputation::Mean)
            .handle_unknown(HandleUnknown::Ignore)
            .build()
            .unwrap();

        assert_eq!(config.artifacts_dir, PathBuf::from("out"));
        assert_eq!(config.target_column, "reading_score");
        assert_eq!(config.categorical_columns, vec!["gender", "lunch"]);
        assert_eq!(config.numeric_imputation, NumericImputation::Mean);
        assert_eq!(config.handle_unknown, HandleUnknown::Ignore);
    }

    #[test]
    fn test_validation_target_in_features() {
        let result = TransformationConfig::builder()
            .target_column("writing_score")
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::TargetInFeatures(col) if col == "writing_score"
        ));
    }

    #[test]
    fn test_validation_overlapping_groups() {
        let result = TransformationConfig::builder()
            .numerical_columns(["writing_score", "lunch"])
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateColumn(col) if col == "lunch"
        ));
    }

    #[test]
    fn test_validation_empty_group() {
        let result = TransformationConfig::builder()
            .categorical_columns(Vec::<String>::new())
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyColumnGroup(_)
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "artifacts_dir": "custom",
            "preprocessor_file_name": "prep.json",
            "target_column": "math_score",
            "numerical_columns": ["reading_score"],
            "categorical_columns": ["gender"],
            "numeric_imputation": "Mean",
            "categorical_imputation": "Constant",
            "handle_unknown": "Ignore"
        }"#;

        let config: TransformationConfig =
            serde_json::from_str(json).expect("Should deserialize from JSON");

        assert!(config.validate().is_ok());
        assert_eq!(
            config.preprocessor_obj_file_path(),
            PathBuf::from("custom").join("prep.json")
        );
        assert_eq!(
            config.categorical_imputation,
            CategoricalImputation::Constant
        );
    }

    #[test]
    fn test_categorical_constant_maps_to_unknown() {
        let strategy: ImputeStrategy = CategoricalImputation::Constant.into();
        assert_eq!(
            strategy,
            ImputeStrategy::Constant(FillValue::Text("Unknown".to_string()))
        );
    }

    #[test]
    fn test_ingestion_defaults() {
        let config = IngestionConfig::builder().build().unwrap();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.train_data_path(), PathBuf::from("artifacts/train.csv"));
        assert_eq!(config.test_data_path(), PathBuf::from("artifacts/test.csv"));
        assert_eq!(config.raw_data_path(), PathBuf::from("artifacts/data.csv"));
    }

    #[test]
    fn test_ingestion_invalid_test_size() {
        for size in [0.0, 1.0, -0.5, 1.5] {
            let result = IngestionConfig::builder().test_size(size).build();
            assert!(
                matches!(result, Err(ConfigValidationError::InvalidTestSize(_))),
                "test_size {size} should be rejected"
            );
        }
    }
}
