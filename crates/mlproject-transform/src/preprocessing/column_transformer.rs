//! Column-wise composition of pipelines.
//!
//! A [`ColumnTransformer`] routes disjoint subsets of the input columns
//! through their own [`Pipeline`] and concatenates the results horizontally.
//! Columns that no entry names are dropped.

use super::{Pipeline, Transformer};
use crate::error::{Result, ResultExt, TransformationError};
use crate::utils::{frame_from_series, load_object, save_object, select_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One pipeline and the columns it consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformerEntry {
    pub name: String,
    pub pipeline: Pipeline,
    pub columns: Vec<String>,
}

/// Applies a pipeline per column group and stacks the outputs.
///
/// Output columns are named `<entry>__<feature>`, in entry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    transformers: Vec<ColumnTransformerEntry>,
    n_rows_seen: Option<usize>,
}

// Ensure the preprocessor can be moved to another thread
static_assertions::assert_impl_all!(ColumnTransformer: Send, Sync);

impl ColumnTransformer {
    /// Build a column transformer from `(name, pipeline, columns)` triples.
    ///
    /// Fails if there are no entries, a name repeats, an entry has no
    /// columns, or two entries share a column.
    pub fn new(transformers: Vec<(&str, Pipeline, Vec<String>)>) -> Result<Self> {
        if transformers.is_empty() {
            return Err(TransformationError::InvalidPipeline(
                "a column transformer needs at least one entry".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut claimed = HashSet::new();
        for (name, _, columns) in &transformers {
            if !names.insert(*name) {
                return Err(TransformationError::InvalidPipeline(format!(
                    "duplicate transformer name '{}'",
                    name
                )));
            }
            if columns.is_empty() {
                return Err(TransformationError::InvalidPipeline(format!(
                    "transformer '{}' has no columns",
                    name
                )));
            }
            for column in columns {
                if !claimed.insert(column.as_str()) {
                    return Err(TransformationError::InvalidPipeline(format!(
                        "column '{}' is claimed by more than one transformer",
                        column
                    )));
                }
            }
        }

        Ok(Self {
            transformers: transformers
                .into_iter()
                .map(|(name, pipeline, columns)| ColumnTransformerEntry {
                    name: name.to_string(),
                    pipeline,
                    columns,
                })
                .collect(),
            n_rows_seen: None,
        })
    }

    pub fn transformers(&self) -> &[ColumnTransformerEntry] {
        &self.transformers
    }

    /// Number of training rows seen by the last fit.
    pub fn n_rows_seen(&self) -> Option<usize> {
        self.n_rows_seen
    }

    /// Number of columns `transform` produces.
    pub fn n_features_out(&self) -> Result<usize> {
        Ok(self.feature_names_out()?.len())
    }

    /// Save the fitted transformer as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if !self.is_fitted() {
            return Err(TransformationError::NotFitted(
                "ColumnTransformer".to_string(),
            ));
        }
        let path = path.as_ref();
        save_object(path, self).context(format!("Saving preprocessor to {}", path.display()))?;
        info!("Preprocessor saved at {}", path.display());
        Ok(())
    }

    /// Load a transformer previously written by [`ColumnTransformer::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let transformer: Self =
            load_object(path).context(format!("Loading preprocessor from {}", path.display()))?;
        debug!(
            "Loaded preprocessor with {} transformers",
            transformer.transformers.len()
        );
        Ok(transformer)
    }
}

fn stack(outputs: Vec<(String, DataFrame)>, height: usize) -> Result<DataFrame> {
    let mut columns = Vec::new();
    for (name, out) in outputs {
        if out.height() != height {
            return Err(TransformationError::FeatureMismatch {
                expected: height,
                got: out.height(),
            });
        }
        for col in out.get_columns() {
            let mut series = col.as_materialized_series().clone();
            let prefixed = format!("{}__{}", name, series.name());
            series.rename(prefixed.into());
            columns.push(series);
        }
    }
    frame_from_series(columns)
}

impl Transformer for ColumnTransformer {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.fit_transform(df).map(|_| ())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted() {
            return Err(TransformationError::NotFitted(
                "ColumnTransformer".to_string(),
            ));
        }

        let mut outputs = Vec::with_capacity(self.transformers.len());
        for entry in &self.transformers {
            let input = select_columns(df, &entry.columns)?;
            let out = entry
                .pipeline
                .transform(&input)
                .context(format!("Transforming with '{}'", entry.name))?;
            outputs.push((entry.name.clone(), out));
        }
        stack(outputs, df.height())
    }

    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        // Cleared until every entry has refit
        self.n_rows_seen = None;

        let mut outputs = Vec::with_capacity(self.transformers.len());
        for entry in &mut self.transformers {
            let input = select_columns(df, &entry.columns)?;
            let out = entry
                .pipeline
                .fit_transform(&input)
                .context(format!("Fitting '{}'", entry.name))?;
            debug!("'{}' produced {} columns", entry.name, out.width());
            outputs.push((entry.name.clone(), out));
        }
        let stacked = stack(outputs, df.height())?;
        self.n_rows_seen = Some(df.height());
        Ok(stacked)
    }

    fn is_fitted(&self) -> bool {
        self.n_rows_seen.is_some() && self.transformers.iter().all(|t| t.pipeline.is_fitted())
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in &self.transformers {
            for feature in entry.pipeline.feature_names_out()? {
                names.push(format!("{}__{}", entry.name, feature));
            }
        }
        Ok(names)
    }
}
