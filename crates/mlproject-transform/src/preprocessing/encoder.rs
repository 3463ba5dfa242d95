//! One-hot encoding for categorical features.
//!
//! Each input column is expanded into one `Float64` indicator column per
//! category seen during fit, named `<column>_<category>`. Categories are
//! compared in their string form and ordered lexicographically.

use super::Transformer;
use crate::error::{Result, TransformationError};
use crate::utils::{column_as_strings, frame_from_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with a category that was not seen during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HandleUnknown {
    /// Fail the transform
    #[default]
    Error,
    /// Encode the row as all zeros for that column
    Ignore,
}

/// Sorted categories learned for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCategories {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
    categories: Option<Vec<ColumnCategories>>,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            handle_unknown: HandleUnknown::default(),
            categories: None,
        }
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// Learned categories per column, `None` before fit.
    pub fn categories(&self) -> Option<&[ColumnCategories]> {
        self.categories.as_deref()
    }

    fn fitted(&self) -> Result<&[ColumnCategories]> {
        self.categories
            .as_deref()
            .ok_or_else(|| TransformationError::NotFitted("OneHotEncoder".to_string()))
    }
}

fn complete_strings(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    column_as_strings(df, column)?
        .into_iter()
        .map(|v| v.ok_or_else(|| TransformationError::MissingValues(column.to_string())))
        .collect()
}

impl Transformer for OneHotEncoder {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut learned = Vec::with_capacity(df.width());
        for name in df.get_column_names() {
            let distinct: BTreeSet<String> = complete_strings(df, name)?.into_iter().collect();
            if distinct.is_empty() {
                return Err(TransformationError::NoValidValues(name.to_string()));
            }
            learned.push(ColumnCategories {
                column: name.to_string(),
                categories: distinct.into_iter().collect(),
            });
        }
        self.categories = Some(learned);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let fitted = self.fitted()?;
        let height = df.height();

        let mut columns = Vec::new();
        for entry in fitted {
            let mut indicators = vec![vec![0.0f64; height]; entry.categories.len()];

            for (row, value) in complete_strings(df, &entry.column)?.iter().enumerate() {
                match entry.categories.binary_search(value) {
                    Ok(idx) => indicators[idx][row] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Ignore => {}
                    Err(_) => {
                        return Err(TransformationError::UnknownCategory {
                            column: entry.column.clone(),
                            category: value.clone(),
                        });
                    }
                }
            }

            for (category, values) in entry.categories.iter().zip(indicators) {
                let name = format!("{}_{}", entry.column, category);
                columns.push(Series::new(name.into(), values));
            }
        }

        frame_from_series(columns)
    }

    fn is_fitted(&self) -> bool {
        self.categories.is_some()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        Ok(self
            .fitted()?
            .iter()
            .flat_map(|entry| {
                entry
                    .categories
                    .iter()
                    .map(move |category| format!("{}_{}", entry.column, category))
            })
            .collect())
    }
}
