//! Standard scaling (z-score normalization).
//!
//! Each column is transformed as `z = (x - u) / s`, where `u` is the training
//! mean and `s` the training population standard deviation. With
//! `with_mean(false)` the centering is skipped, which keeps zeros at zero for
//! indicator columns produced by one-hot encoding.

use super::Transformer;
use crate::error::{Result, TransformationError};
use crate::utils::{column_as_f64, frame_from_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Deviations below this are treated as zero and leave the column unscaled.
const ZERO_SCALE_EPSILON: f64 = 10.0 * f64::EPSILON;

/// Parameters learned for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub mean: f64,
    /// Divisor applied in transform; 1.0 for constant columns.
    pub scale: f64,
}

/// Scales numeric columns to unit variance, optionally centering them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    with_std: bool,
    params: Option<Vec<ColumnScale>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            with_mean: true,
            with_std: true,
            params: None,
        }
    }

    /// Set whether to center data by the mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.with_std = with_std;
        self
    }

    pub fn params(&self) -> Option<&[ColumnScale]> {
        self.params.as_deref()
    }
}

fn complete_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    column_as_f64(df, column)?
        .into_iter()
        .map(|v| v.ok_or_else(|| TransformationError::MissingValues(column.to_string())))
        .collect()
}

impl Transformer for StandardScaler {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut params = Vec::with_capacity(df.width());
        for name in df.get_column_names() {
            let values = complete_values(df, name)?;
            if values.is_empty() {
                return Err(TransformationError::NoValidValues(name.to_string()));
            }

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();

            let scale = if !self.with_std || std < ZERO_SCALE_EPSILON {
                1.0
            } else {
                std
            };

            params.push(ColumnScale {
                column: name.to_string(),
                mean,
                scale,
            });
        }
        self.params = Some(params);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| TransformationError::NotFitted("StandardScaler".to_string()))?;

        let mut columns = Vec::with_capacity(params.len());
        for param in params {
            let offset = if self.with_mean { param.mean } else { 0.0 };
            let scaled: Vec<f64> = complete_values(df, &param.column)?
                .into_iter()
                .map(|v| (v - offset) / param.scale)
                .collect();
            columns.push(Series::new(param.column.as_str().into(), scaled));
        }

        frame_from_series(columns)
    }

    fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.params
            .as_ref()
            .map(|params| params.iter().map(|p| p.column.clone()).collect())
            .ok_or_else(|| TransformationError::NotFitted("StandardScaler".to_string()))
    }
}
