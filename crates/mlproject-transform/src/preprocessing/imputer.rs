//! Statistical imputation of missing values.
//!
//! Provides mean, median, most-frequent and constant fill strategies.

use super::Transformer;
use crate::error::{Result, TransformationError};
use crate::utils::{column_as_f64, column_as_strings, frame_from_series, is_numeric_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How a [`SimpleImputer`] chooses the fill value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Mean of the non-missing values (numeric columns only)
    Mean,
    /// Median of the non-missing values (numeric columns only)
    Median,
    /// Most frequent value; ties go to the smallest value
    MostFrequent,
    /// A fixed value
    Constant(FillValue),
}

/// A learned fill value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Fill value learned for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistic {
    pub column: String,
    pub value: FillValue,
}

/// Replaces nulls with a per-column statistic learned during fit.
///
/// Output columns keep the input column names and order. Numeric fills
/// produce `Float64` columns and text fills produce `String` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    statistics: Option<Vec<ColumnStatistic>>,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            statistics: None,
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Learned fill values, `None` before fit.
    pub fn statistics(&self) -> Option<&[ColumnStatistic]> {
        self.statistics.as_deref()
    }

    fn learn(&self, df: &DataFrame, column: &str) -> Result<FillValue> {
        match &self.strategy {
            ImputeStrategy::Mean => {
                let values = non_missing_numbers(df, column)?;
                Ok(FillValue::Number(
                    values.iter().sum::<f64>() / values.len() as f64,
                ))
            }
            ImputeStrategy::Median => {
                let mut values = non_missing_numbers(df, column)?;
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                let median = if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                };
                Ok(FillValue::Number(median))
            }
            ImputeStrategy::MostFrequent => {
                let dtype = df.column(column)?.dtype().clone();
                if is_numeric_dtype(&dtype) {
                    most_frequent_number(non_missing_numbers(df, column)?)
                        .map(FillValue::Number)
                        .ok_or_else(|| TransformationError::NoValidValues(column.to_string()))
                } else {
                    most_frequent_text(column_as_strings(df, column)?)
                        .map(FillValue::Text)
                        .ok_or_else(|| TransformationError::NoValidValues(column.to_string()))
                }
            }
            ImputeStrategy::Constant(value) => Ok(value.clone()),
        }
    }
}

impl Transformer for SimpleImputer {
    fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let mut statistics = Vec::with_capacity(df.width());
        for name in df.get_column_names() {
            let value = self.learn(df, name)?;
            debug!("Imputer learned {:?} for '{}'", value, name);
            statistics.push(ColumnStatistic {
                column: name.to_string(),
                value,
            });
        }
        self.statistics = Some(statistics);
        Ok(())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let statistics = self
            .statistics
            .as_ref()
            .ok_or_else(|| TransformationError::NotFitted("SimpleImputer".to_string()))?;

        let mut columns = Vec::with_capacity(statistics.len());
        for stat in statistics {
            let name = PlSmallStr::from(stat.column.as_str());
            let series = match &stat.value {
                FillValue::Number(fill) => {
                    let filled: Vec<f64> = column_as_f64(df, &stat.column)?
                        .into_iter()
                        .map(|v| match v {
                            Some(x) if !x.is_nan() => x,
                            _ => *fill,
                        })
                        .collect();
                    Series::new(name, filled)
                }
                FillValue::Text(fill) => {
                    let filled: Vec<String> = column_as_strings(df, &stat.column)?
                        .into_iter()
                        .map(|v| v.unwrap_or_else(|| fill.clone()))
                        .collect();
                    Series::new(name, filled)
                }
            };
            columns.push(series);
        }

        frame_from_series(columns)
    }

    fn is_fitted(&self) -> bool {
        self.statistics.is_some()
    }

    fn feature_names_out(&self) -> Result<Vec<String>> {
        self.statistics
            .as_ref()
            .map(|stats| stats.iter().map(|s| s.column.clone()).collect())
            .ok_or_else(|| TransformationError::NotFitted("SimpleImputer".to_string()))
    }
}

fn non_missing_numbers(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = column_as_f64(df, column)?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    if values.is_empty() {
        return Err(TransformationError::NoValidValues(column.to_string()));
    }
    Ok(values)
}

fn most_frequent_number(mut values: Vec<f64>) -> Option<f64> {
    values.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let run = values[i..].iter().take_while(|&&v| v == values[i]).count();
        // Strictly greater keeps the smallest value on ties.
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((values[i], run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

fn most_frequent_text(values: Vec<Option<String>>) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Median / Mean
    // ========================================================================

    #[test]
    fn test_median_fills_nulls() {
        let df = df![
            "writing_score" => [Some(70i64), None, Some(90), Some(80)],
        ]
        .unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);

        let out = imputer.fit_transform(&df).unwrap();

        let values = column_as_f64(&out, "writing_score").unwrap();
        assert_eq!(values, vec![Some(70.0), Some(80.0), Some(90.0), Some(80.0)]);
        assert_eq!(out.column("writing_score").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_median_even_count_averages_middle() {
        let df = df!["v" => [Some(1.0), Some(4.0), None, Some(2.0), Some(10.0)]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        imputer.fit(&df).unwrap();

        assert_eq!(
            imputer.statistics().unwrap()[0].value,
            FillValue::Number(3.0)
        );
    }

    #[test]
    fn test_nan_is_filled_like_null() {
        let df = df!["v" => [Some(1.0), Some(f64::NAN), Some(3.0), None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);

        let out = imputer.fit_transform(&df).unwrap();

        assert_eq!(imputer.statistics().unwrap()[0].value, FillValue::Number(2.0));
        assert_eq!(
            column_as_f64(&out, "v").unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0), Some(2.0)]
        );
    }

    #[test]
    fn test_mean_fills_nulls() {
        let df = df!["v" => [Some(1.0), None, Some(5.0)]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean);

        let out = imputer.fit_transform(&df).unwrap();
        assert_eq!(column_as_f64(&out, "v").unwrap()[1], Some(3.0));
    }

    #[test]
    fn test_all_null_column_is_rejected() {
        let df = df!["v" => [Option::<f64>::None, None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);

        let err = imputer.fit(&df).unwrap_err();
        assert!(matches!(err, TransformationError::NoValidValues(c) if c == "v"));
    }

    // ========================================================================
    // Most frequent
    // ========================================================================

    #[test]
    fn test_most_frequent_text() {
        let df = df![
            "lunch" => [Some("standard"), Some("free/reduced"), Some("standard"), None],
        ]
        .unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::MostFrequent);

        let out = imputer.fit_transform(&df).unwrap();

        let values = column_as_strings(&out, "lunch").unwrap();
        assert_eq!(values[3].as_deref(), Some("standard"));
        assert_eq!(out.column("lunch").unwrap().null_count(), 0);
    }

    #[test]
    fn test_most_frequent_tie_picks_smallest() {
        let df = df!["gender" => [Some("male"), Some("female"), None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df).unwrap();

        assert_eq!(
            imputer.statistics().unwrap()[0].value,
            FillValue::Text("female".to_string())
        );
    }

    #[test]
    fn test_most_frequent_numeric_column() {
        let df = df!["v" => [Some(3i64), Some(1), Some(3), Some(1), None]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::MostFrequent);
        imputer.fit(&df).unwrap();

        assert_eq!(
            imputer.statistics().unwrap()[0].value,
            FillValue::Number(1.0)
        );
    }

    // ========================================================================
    // Constant / lifecycle
    // ========================================================================

    #[test]
    fn test_constant_fill() {
        let df = df!["course" => [None, Some("completed")]].unwrap();
        let mut imputer =
            SimpleImputer::new(ImputeStrategy::Constant(FillValue::Text("Unknown".into())));

        let out = imputer.fit_transform(&df).unwrap();
        assert_eq!(
            column_as_strings(&out, "course").unwrap(),
            vec![Some("Unknown".to_string()), Some("completed".to_string())]
        );
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!["v" => [1.0]].unwrap();
        let imputer = SimpleImputer::new(ImputeStrategy::Median);

        assert!(!imputer.is_fitted());
        assert!(matches!(
            imputer.transform(&df),
            Err(TransformationError::NotFitted(_))
        ));
    }

    #[test]
    fn test_transform_uses_training_statistic() {
        let train = df!["v" => [Some(10.0), Some(20.0), Some(30.0)]].unwrap();
        let test = df!["v" => [Option::<f64>::None, Some(5.0)]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        imputer.fit(&train).unwrap();

        let out = imputer.transform(&test).unwrap();
        assert_eq!(column_as_f64(&out, "v").unwrap(), vec![Some(20.0), Some(5.0)]);
    }

    #[test]
    fn test_transform_missing_column() {
        let train = df!["a" => [1.0], "b" => [2.0]].unwrap();
        let test = df!["a" => [1.0]].unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean);
        imputer.fit(&train).unwrap();

        assert!(matches!(
            imputer.transform(&test),
            Err(TransformationError::ColumnNotFound(c)) if c == "b"
        ));
    }
}
