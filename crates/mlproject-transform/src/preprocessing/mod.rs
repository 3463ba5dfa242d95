//! Fit/transform building blocks for tabular preprocessing.
//!
//! Every step learns its parameters from a training frame in [`Transformer::fit`]
//! and applies them to any frame with the same columns in
//! [`Transformer::transform`]. Steps are chained by [`Pipeline`] and applied
//! to disjoint column subsets by [`ColumnTransformer`].
//!
//! All fitted state is serde-serializable, so a fitted [`ColumnTransformer`]
//! can be written to disk and reloaded with identical behaviour.

mod column_transformer;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use column_transformer::{ColumnTransformer, ColumnTransformerEntry};
pub use encoder::{ColumnCategories, HandleUnknown, OneHotEncoder};
pub use imputer::{ColumnStatistic, FillValue, ImputeStrategy, SimpleImputer};
pub use pipeline::{NamedStep, Pipeline};
pub use scaler::{ColumnScale, StandardScaler};

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A preprocessing step with a fit phase and a transform phase.
pub trait Transformer {
    /// Learn parameters from `df`.
    fn fit(&mut self, df: &DataFrame) -> Result<()>;

    /// Apply the learned parameters to `df`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TransformationError::NotFitted`] when called before `fit`.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;

    /// Fit on `df`, then transform it.
    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    fn is_fitted(&self) -> bool;

    /// Names of the columns `transform` produces.
    fn feature_names_out(&self) -> Result<Vec<String>>;
}

/// Any step that can appear in a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineStep {
    Imputer(SimpleImputer),
    Scaler(StandardScaler),
    OneHotEncoder(OneHotEncoder),
}

impl PipelineStep {
    fn inner(&self) -> &dyn Transformer {
        match self {
            Self::Imputer(step) => step,
            Self::Scaler(step) => step,
            Self::OneHotEncoder(step) => step,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Transformer {
        match self {
            Self::Imputer(step) => step,
            Self::Scaler(step) => step,
            Self::OneHotEncoder(step) => step,
        }
    }
}

impl Transformer for PipelineStep {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.inner_mut().fit(df)
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.inner().transform(df)
    }

    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.inner_mut().fit_transform(df)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.inner().feature_names_out()
    }
}

impl From<SimpleImputer> for PipelineStep {
    fn from(step: SimpleImputer) -> Self {
        Self::Imputer(step)
    }
}

impl From<StandardScaler> for PipelineStep {
    fn from(step: StandardScaler) -> Self {
        Self::Scaler(step)
    }
}

impl From<OneHotEncoder> for PipelineStep {
    fn from(step: OneHotEncoder) -> Self {
        Self::OneHotEncoder(step)
    }
}
