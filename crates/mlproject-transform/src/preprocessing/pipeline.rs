//! Sequential chaining of preprocessing steps.

use super::{PipelineStep, Transformer};
use crate::error::{Result, ResultExt, TransformationError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A step together with its name inside a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStep {
    pub name: String,
    pub step: PipelineStep,
}

/// An ordered list of named steps; each step feeds the next.
///
/// # Example
///
/// ```rust,ignore
/// use mlproject_transform::preprocessing::*;
///
/// let num_pipeline = Pipeline::new(vec![
///     ("imputer", SimpleImputer::new(ImputeStrategy::Median).into()),
///     ("scaler", StandardScaler::new().with_mean(false).into()),
/// ])?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    steps: Vec<NamedStep>,
}

impl Pipeline {
    /// Build a pipeline from `(name, step)` pairs.
    ///
    /// Fails if the list is empty or a name is used twice.
    pub fn new(steps: Vec<(&str, PipelineStep)>) -> Result<Self> {
        if steps.is_empty() {
            return Err(TransformationError::InvalidPipeline(
                "a pipeline needs at least one step".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, _) in &steps {
            if !seen.insert(*name) {
                return Err(TransformationError::InvalidPipeline(format!(
                    "duplicate step name '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            steps: steps
                .into_iter()
                .map(|(name, step)| NamedStep {
                    name: name.to_string(),
                    step,
                })
                .collect(),
        })
    }

    pub fn steps(&self) -> &[NamedStep] {
        &self.steps
    }

    /// Look up a step by name.
    pub fn named_step(&self, name: &str) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.step)
    }
}

impl Transformer for Pipeline {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        self.fit_transform(df).map(|_| ())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();
        for NamedStep { name, step } in &self.steps {
            current = step
                .transform(&current)
                .context(format!("Applying step '{}'", name))?;
        }
        Ok(current)
    }

    fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();
        for NamedStep { name, step } in &mut self.steps {
            current = step
                .fit_transform(&current)
                .context(format!("Fitting step '{}'", name))?;
        }
        Ok(current)
    }

    fn is_fitted(&self) -> bool {
        self.steps.iter().all(|s| s.step.is_fitted())
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        match self.steps.last() {
            Some(last) => last.step.feature_names_out(),
            None => Ok(Vec::new()),
        }
    }
}
