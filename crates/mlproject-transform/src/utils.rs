//! Shared helpers: CSV I/O, artifact persistence and column extraction.

use crate::error::{Result, ResultExt, TransformationError};
use polars::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Extraction
// =============================================================================

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| TransformationError::ColumnNotFound(name.to_string()))
}

/// Read a column as `f64` values, keeping nulls.
///
/// Fails if the column holds values that cannot be cast to a number.
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let casted = series(df, name)?
        .strict_cast(&DataType::Float64)
        .context(format!("Casting column '{}' to Float64", name))?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Read a column in its string form, keeping nulls.
pub fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let casted = series(df, name)?.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Assemble a DataFrame from already-built series.
pub fn frame_from_series(columns: Vec<Series>) -> Result<DataFrame> {
    Ok(DataFrame::new(columns.into_iter().map(Column::from).collect())?)
}

/// Select `columns` from `df`, failing with `ColumnNotFound` on the first absent one.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    for name in columns {
        series(df, name)?;
    }
    Ok(df.select(columns.iter().map(String::as_str))?)
}

// =============================================================================
// CSV I/O
// =============================================================================

/// Load a CSV file with a header row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TransformationError::FileNotFound(path.display().to_string()));
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("Reading CSV file {}", path.display()))?;

    debug!("Loaded {} with shape {:?}", path.display(), df.shape());
    Ok(df)
}

/// Write a DataFrame as CSV, creating parent directories as needed.
pub fn write_csv(path: impl AsRef<Path>, df: &mut DataFrame) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

// =============================================================================
// Artifact Persistence
// =============================================================================

/// Serialize `obj` as JSON to `path`, creating parent directories as needed.
pub fn save_object<T: Serialize>(path: impl AsRef<Path>, obj: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let file = File::create(path).context(format!("Creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, obj)?;
    writer.flush()?;
    Ok(())
}

/// Deserialize a JSON artifact previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TransformationError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path).context(format!("Opening {}", path.display()))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Creating directory {}", parent.display()))?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
