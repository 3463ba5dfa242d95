//! Error types for the data transformation pipeline.
//!
//! Every failure in the crate is reported as a [`TransformationError`].
//! Operation boundaries wrap the underlying error with a context message and
//! the source location of the call site, so a failure deep inside a fit step
//! still points back at the operation that triggered it.

use crate::config::ConfigValidationError;
use std::panic::Location;
use thiserror::Error;

/// The main error type for the transformation pipeline.
#[derive(Error, Debug)]
pub enum TransformationError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// No non-missing values were available to learn a statistic from.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// A step that cannot handle nulls received a column containing them.
    #[error("Column '{0}' contains missing values")]
    MissingValues(String),

    /// A category not seen during fit was found during transform.
    #[error("Found unknown category '{category}' in column '{column}' during transform")]
    UnknownCategory { column: String, category: String },

    /// A transformer was used before being fitted.
    #[error("{0} is not fitted yet")]
    NotFitted(String),

    /// Input row count or column count does not match what was expected.
    #[error("Feature mismatch: expected {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// A pipeline or column transformer was assembled incorrectly.
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// The dataset cannot be split as requested.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error wrapped with context and the location it was raised from.
    #[error("{context} (at {location}): {source}")]
    WithContext {
        context: String,
        location: String,
        #[source]
        source: Box<TransformationError>,
    },
}

impl TransformationError {
    /// Add context to an error, recording the caller's file and line.
    #[track_caller]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let location = Location::caller();
        TransformationError::WithContext {
            context: context.into(),
            location: format!("{}:{}", location.file(), location.line()),
            source: Box::new(self),
        }
    }

    /// Stable error code, unchanged by context layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::MissingValues(_) => "MISSING_VALUES",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::FeatureMismatch { .. } => "FEATURE_MISMATCH",
            Self::InvalidPipeline(_) => "INVALID_PIPELINE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidSplit(_) => "INVALID_SPLIT",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, with every context layer stripped.
    pub fn root_cause(&self) -> &TransformationError {
        match self {
            Self::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for transformation operations.
pub type Result<T> = std::result::Result<T, TransformationError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

// `match` instead of `map_err` so `#[track_caller]` sees the real call site.
impl<T> ResultExt<T> for Result<T> {
    #[track_caller]
    fn context(self, context: impl Into<String>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.with_context(context)),
        }
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    #[track_caller]
    fn context(self, context: impl Into<String>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(TransformationError::Polars(e).with_context(context)),
        }
    }
}

impl<T> ResultExt<T> for std::io::Result<T> {
    #[track_caller]
    fn context(self, context: impl Into<String>) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(TransformationError::Io(e).with_context(context)),
        }
    }
}
