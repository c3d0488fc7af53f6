//! Data loading and column extraction utilities

use crate::error::{FairnessError, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Decision threshold applied to scores when no predicted labels are given
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Load a CSV, JSON or Parquet file, chosen by extension
pub fn load_data(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let df = match ext.as_str() {
        "csv" => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .into_reader_with_file_handle(File::open(path)?)
            .finish()?,
        "json" => JsonReader::new(File::open(path)?).finish()?,
        "parquet" => ParquetReader::new(File::open(path)?).finish()?,
        other => {
            return Err(FairnessError::InvalidInput(format!(
                "Unsupported file format: '{}'",
                other
            )))
        }
    };

    Ok(df)
}

/// Extract a numeric column as `Array1<f64>`. Nulls are rejected.
pub fn column_to_array(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(name)
        .map_err(|_| FairnessError::FeatureNotFound(name.to_string()))?;

    let casted = column.cast(&DataType::Float64).map_err(|e| {
        FairnessError::DataError(format!("column '{}' is not numeric: {}", name, e))
    })?;
    let values = casted.as_materialized_series().f64()?;

    // A failed string-to-float cast turns values into nulls
    if values.null_count() > 0 {
        return Err(FairnessError::InvalidInput(format!(
            "column '{}' has {} missing or non-numeric values",
            name,
            values.null_count()
        )));
    }

    Ok(values.into_iter().flatten().collect())
}

/// 0/1 labels from scores: 1 where `score >= threshold`
pub fn predictions_from_scores(scores: &Array1<f64>, threshold: f64) -> Array1<f64> {
    scores.mapv(|s| if s >= threshold { 1.0 } else { 0.0 })
}

/// Drop the named columns that exist in `df`, ignoring the rest
pub fn drop_existing(df: &DataFrame, columns: &[&str]) -> DataFrame {
    let names: Vec<PlSmallStr> = columns
        .iter()
        .filter(|c| df.column(c).is_ok())
        .map(|c| PlSmallStr::from(*c))
        .collect();
    df.drop_many(names)
}
