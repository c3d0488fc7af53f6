//! Similarity-based individual fairness
//!
//! Similar individuals (close in standardized feature space) should receive
//! similar scores. Rows are sampled, every sampled pair within the distance
//! threshold is compared, and the share of those pairs whose scores differ by
//! more than the threshold is reported.

use super::config::IndividualFairnessConfig;
use crate::error::{FairnessError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of the individual fairness test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualFairnessResult {
    /// Violations / similar pairs, 0 when no pair was similar
    pub violation_rate: f64,
    /// Number of sampled pairs that passed the similarity gate
    pub pairs_evaluated: usize,
    /// Number of rows drawn for the pairwise scan
    pub sample_size: usize,
}

/// Pairwise similarity test over a row sample
#[derive(Debug, Clone, Default)]
pub struct IndividualFairnessEvaluator {
    config: IndividualFairnessConfig,
}

impl IndividualFairnessEvaluator {
    pub fn new(config: IndividualFairnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndividualFairnessConfig {
        &self.config
    }

    /// Run the test on the numeric columns of `features` not listed in `excluded`.
    ///
    /// A table without usable numeric columns yields a zero violation rate.
    pub fn evaluate(
        &self,
        features: &DataFrame,
        scores: &Array1<f64>,
        excluded: &[String],
    ) -> Result<IndividualFairnessResult> {
        if scores.len() != features.height() {
            return Err(FairnessError::length_mismatch(
                "scores",
                features.height(),
                scores.len(),
            ));
        }

        let Some(x) = standardized_features(features, excluded)? else {
            debug!("No numeric features for individual fairness, skipping");
            return Ok(IndividualFairnessResult::default());
        };

        let n = x.nrows();
        let sample_size = n.min(self.config.max_samples);
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let sample = index::sample(&mut rng, n, sample_size).into_vec();

        let threshold = self.config.distance_threshold;
        let (similar, violations) = (0..sample.len())
            .into_par_iter()
            .map(|a| {
                let i = sample[a];
                let row_i = x.row(i);
                let mut similar = 0usize;
                let mut violations = 0usize;
                for &j in &sample[a + 1..] {
                    if euclidean(row_i, x.row(j)) <= threshold {
                        similar += 1;
                        if (scores[i] - scores[j]).abs() > threshold {
                            violations += 1;
                        }
                    }
                }
                (similar, violations)
            })
            .reduce(|| (0, 0), |l, r| (l.0 + r.0, l.1 + r.1));

        let violation_rate = if similar > 0 {
            violations as f64 / similar as f64
        } else {
            0.0
        };

        debug!(
            sample_size,
            similar_pairs = similar,
            violations,
            "Evaluated individual fairness"
        );

        Ok(IndividualFairnessResult {
            violation_rate,
            pairs_evaluated: similar,
            sample_size,
        })
    }
}

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn is_numeric(dtype: &DataType) -> bool {
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

/// Mean-impute and z-score the numeric columns of `df` that are not excluded.
///
/// Returns a row-major matrix, or `None` when no numeric column remains.
/// Standardization uses the population standard deviation; constant columns
/// are centered but not scaled.
pub(crate) fn standardized_features(
    df: &DataFrame,
    excluded: &[String],
) -> Result<Option<Array2<f64>>> {
    let columns: Vec<&Column> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()))
        .filter(|c| !excluded.iter().any(|e| e.as_str() == c.name().as_str()))
        .collect();

    if columns.is_empty() {
        return Ok(None);
    }

    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| standardize_column(column))
        .collect::<Result<Vec<_>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Some(Array2::from_shape_fn(
        (n_rows, col_refs.len()),
        |(r, c)| col_refs[c][r],
    )))
}

fn standardize_column(column: &Column) -> Result<Vec<f64>> {
    let casted = column.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = casted
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();

    if values.is_empty() {
        return Ok(Vec::new());
    }

    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return Err(FairnessError::ComputationError(format!(
            "column '{}' has no values to impute from",
            column.name()
        )));
    }

    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let imputed: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(mean)).collect();

    // Imputed values sit at the mean, so the filled column keeps the same mean
    let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / imputed.len() as f64;
    let std = variance.sqrt();
    let scale = if std == 0.0 { 1.0 } else { std };

    let scaled: Vec<f64> = imputed.into_iter().map(|v| (v - mean) / scale).collect();
    if scaled.iter().any(|v| !v.is_finite()) {
        return Err(FairnessError::ComputationError(format!(
            "column '{}' produced non-finite standardized values",
            column.name()
        )));
    }
    Ok(scaled)
}
