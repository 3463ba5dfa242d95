//! Data transformation stage.
//!
//! Builds the preprocessing object for the student exam-score dataset, fits
//! it on the training split, transforms both splits and persists the fitted
//! object so the same transformation can be replayed at inference time.

use crate::config::TransformationConfig;
use crate::error::{Result, ResultExt, TransformationError};
use crate::preprocessing::{
    ColumnTransformer, OneHotEncoder, Pipeline, SimpleImputer, StandardScaler, Transformer,
};
use crate::utils::{column_as_f64, read_csv};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Result of [`DataTransformation::initiate_data_transformation`].
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    /// Transformed training features with the target as the last column.
    pub train_arr: DataFrame,
    /// Transformed test features with the target as the last column.
    pub test_arr: DataFrame,
    /// Where the fitted preprocessor was written.
    pub preprocessor_path: PathBuf,
}

/// Fits and applies the preprocessing object.
///
/// # Example
///
/// ```rust,ignore
/// use mlproject_transform::DataTransformation;
///
/// let output = DataTransformation::new()
///     .initiate_data_transformation("artifacts/train.csv", "artifacts/test.csv")?;
///
/// println!("train: {:?}", output.train_arr.shape());
/// println!("preprocessor: {}", output.preprocessor_path.display());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataTransformation {
    data_transformation_config: TransformationConfig,
}

static_assertions::assert_impl_all!(DataTransformation: Send, Sync);

impl DataTransformation {
    /// Create a transformation stage with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransformationConfig) -> Self {
        Self {
            data_transformation_config: config,
        }
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.data_transformation_config
    }

    /// Build the unfitted preprocessing object.
    ///
    /// Numeric columns go through median imputation and scaling. Categorical
    /// columns go through most-frequent imputation, one-hot encoding and
    /// scaling. Scaling never centers, so encoded zeros stay zero.
    pub fn data_transformer_object(&self) -> Result<ColumnTransformer> {
        self.build_preprocessor()
            .context("Failed to build data transformer object")
    }

    fn build_preprocessor(&self) -> Result<ColumnTransformer> {
        let config = &self.data_transformation_config;

        let num_pipeline = Pipeline::new(vec![
            ("imputer", SimpleImputer::new(config.numeric_imputation.into()).into()),
            ("scaler", StandardScaler::new().with_mean(false).into()),
        ])?;

        let cat_pipeline = Pipeline::new(vec![
            (
                "imputer",
                SimpleImputer::new(config.categorical_imputation.into()).into(),
            ),
            (
                "one_hot_encoder",
                OneHotEncoder::new()
                    .with_handle_unknown(config.handle_unknown)
                    .into(),
            ),
            ("scaler", StandardScaler::new().with_mean(false).into()),
        ])?;

        info!("Categorical Columns: {:?}", config.categorical_columns);
        info!("Numerical Columns: {:?}", config.numerical_columns);

        ColumnTransformer::new(vec![
            ("num_pipeline", num_pipeline, config.numerical_columns.clone()),
            ("cat_pipeline", cat_pipeline, config.categorical_columns.clone()),
        ])
    }

    /// Read both splits, fit on train, transform both and save the preprocessor.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped with context. A missing target column surfaces
    /// as [`TransformationError::ColumnNotFound`] at the root.
    pub fn initiate_data_transformation(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
    ) -> Result<TransformationOutput> {
        self.run(train_path.as_ref(), test_path.as_ref())
            .context("Data transformation failed")
    }

    fn run(&self, train_path: &Path, test_path: &Path) -> Result<TransformationOutput> {
        let config = &self.data_transformation_config;

        let train_df = read_csv(train_path)?;
        let test_df = read_csv(test_path)?;

        info!("Read train and test data completed");
        info!("Obtaining preprocessing object");

        let mut preprocessing_obj = self.data_transformer_object()?;

        let (input_feature_train_df, target_feature_train) =
            split_target(&train_df, &config.target_column)?;
        let (input_feature_test_df, target_feature_test) =
            split_target(&test_df, &config.target_column)?;

        info!("Applying preprocessing object on training and testing dataframes");

        let input_feature_train_arr = match preprocessing_obj.fit_transform(&input_feature_train_df)
        {
            Ok(arr) => {
                info!("Transformation of training data successful.");
                arr
            }
            Err(e) => {
                error!("Error during training data transformation: {}", e);
                return Err(e);
            }
        };

        let input_feature_test_arr = match preprocessing_obj.transform(&input_feature_test_df) {
            Ok(arr) => {
                info!("Transformation of test data successful.");
                arr
            }
            Err(e) => {
                error!("Error during test data transformation: {}", e);
                return Err(e);
            }
        };

        let train_arr = append_target(input_feature_train_arr, target_feature_train)?;
        let test_arr = append_target(input_feature_test_arr, target_feature_test)?;

        info!("Saving preprocessing object to disk...");
        let preprocessor_path = config.preprocessor_obj_file_path();
        preprocessing_obj.save(&preprocessor_path)?;

        Ok(TransformationOutput {
            train_arr,
            test_arr,
            preprocessor_path,
        })
    }

    /// Load a preprocessor saved by [`DataTransformation::initiate_data_transformation`].
    pub fn load_preprocessor(path: impl AsRef<Path>) -> Result<ColumnTransformer> {
        ColumnTransformer::load(path)
    }

    /// Load a saved preprocessor and apply it to `features`.
    ///
    /// Columns the preprocessor does not use, the target included, are ignored.
    pub fn transform_with_saved(path: impl AsRef<Path>, features: &DataFrame) -> Result<DataFrame> {
        let preprocessor = Self::load_preprocessor(path)?;
        preprocessor
            .transform(features)
            .context("Applying saved preprocessor")
    }
}

/// Split `df` into its feature columns and the `Float64` target series.
fn split_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Series)> {
    if df.column(target).is_err() {
        return Err(TransformationError::ColumnNotFound(target.to_string()));
    }

    let values = column_as_f64(df, target)?;
    let target_series = Series::new(target.into(), values);
    let features = df.drop(target)?;
    Ok((features, target_series))
}

/// Append the target as the last column.
fn append_target(mut features: DataFrame, target: Series) -> Result<DataFrame> {
    if features.height() != target.len() {
        return Err(TransformationError::FeatureMismatch {
            expected: features.height(),
            got: target.len(),
        });
    }
    features.with_column(target)?;
    Ok(features)
}
