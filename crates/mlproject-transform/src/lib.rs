//! Student Exam-Score Preprocessing
//!
//! Builds, fits and persists the preprocessing object for the student
//! exam-score dataset, using Polars DataFrames throughout.
//!
//! # Overview
//!
//! - **Ingestion**: copy a source CSV into `artifacts/` and write a seeded train/test split
//! - **Preprocessing primitives**: imputation, standard scaling, one-hot encoding,
//!   pipelines and a column-wise composer, all serde-serializable once fitted
//! - **Transformation**: fit on the training split, transform both splits, append the
//!   target column and save the fitted preprocessor to `artifacts/preprocessor.json`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mlproject_transform::{DataIngestion, DataTransformation};
//!
//! let split = DataIngestion::new().initiate_data_ingestion("notebook/data/stud.csv")?;
//!
//! let output = DataTransformation::new()
//!     .initiate_data_transformation(&split.train_path, &split.test_path)?;
//!
//! // Feature columns followed by `math_score`
//! println!("{:?}", output.train_arr.shape());
//! ```
//!
//! # Reusing the fitted preprocessor
//!
//! ```rust,ignore
//! use mlproject_transform::DataTransformation;
//!
//! let features = mlproject_transform::utils::read_csv("new_students.csv")?;
//! let transformed =
//!     DataTransformation::transform_with_saved("artifacts/preprocessor.json", &features)?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use mlproject_transform::config::*;
//! use mlproject_transform::preprocessing::HandleUnknown;
//!
//! let config = TransformationConfig::builder()
//!     .artifacts_dir("artifacts")
//!     .target_column("math_score")
//!     .numeric_imputation(NumericImputation::Mean)
//!     .handle_unknown(HandleUnknown::Ignore)
//!     .build()?;
//! ```

pub mod config;
pub mod error;
pub mod ingestion;
pub mod preprocessing;
pub mod transformation;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    CategoricalImputation, ConfigValidationError, IngestionConfig, NumericImputation,
    TransformationConfig, TransformationConfigBuilder,
};
pub use error::{Result as TransformationResult, ResultExt, TransformationError};
pub use ingestion::{DataIngestion, IngestionOutput, train_test_split};
pub use preprocessing::{
    ColumnTransformer, HandleUnknown, ImputeStrategy, OneHotEncoder, Pipeline, PipelineStep,
    SimpleImputer, StandardScaler, Transformer,
};
pub use transformation::{DataTransformation, TransformationOutput};
pub use utils::{load_object, read_csv, save_object, write_csv};
