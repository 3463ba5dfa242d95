//! Data ingestion stage.
//!
//! Copies a source CSV into the artifacts directory and writes a seeded
//! train/test split next to it.

use crate::config::IngestionConfig;
use crate::error::{Result, ResultExt, TransformationError};
use crate::utils::{read_csv, write_csv};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of [`DataIngestion::initiate_data_ingestion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionOutput {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct DataIngestion {
    ingestion_config: IngestionConfig,
}

impl DataIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IngestionConfig) -> Self {
        Self {
            ingestion_config: config,
        }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.ingestion_config
    }

    /// Read `source`, save a raw copy and write the train and test splits.
    pub fn initiate_data_ingestion(&self, source: impl AsRef<Path>) -> Result<IngestionOutput> {
        self.run(source.as_ref()).context("Data ingestion failed")
    }

    fn run(&self, source: &Path) -> Result<IngestionOutput> {
        let config = &self.ingestion_config;

        let mut df = read_csv(source)?;
        info!("Read the dataset as dataframe: {:?}", df.shape());

        write_csv(config.raw_data_path(), &mut df)?;

        info!("Train test split initiated");
        let (mut train_set, mut test_set) = train_test_split(&df, config.test_size, config.seed)?;

        let train_path = config.train_data_path();
        let test_path = config.test_data_path();
        write_csv(&train_path, &mut train_set)?;
        write_csv(&test_path, &mut test_set)?;

        info!(
            "Ingestion of the data is completed: {} train rows, {} test rows",
            train_set.height(),
            test_set.height()
        );

        Ok(IngestionOutput {
            train_path,
            test_path,
        })
    }
}

/// Shuffle rows with a seeded RNG and split off `ceil(test_size * n)` test rows.
///
/// Both splits always get at least one row.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    let n = df.height();
    if n < 2 {
        return Err(TransformationError::InvalidSplit(format!(
            "need at least 2 rows, got {}",
            n
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TransformationError::InvalidSplit(format!(
            "test size {} is outside (0, 1)",
            test_size
        )));
    }

    let n_test = ((test_size * n as f64).ceil() as usize).clamp(1, n - 1);

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;
    Ok((train, test))
}
