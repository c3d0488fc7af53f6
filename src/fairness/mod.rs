//! Fairness Metrics Module
//!
//! Evaluates a credit scoring model's predictions for group and individual
//! fairness and folds the results into a single scored assessment.
//!
//! - [`GroupMetrics`] - confusion-matrix rates for one group
//! - [`FairnessMetrics`] - disparities across the groups of one attribute
//! - [`GroupFairnessEvaluator`] - per-attribute group evaluation over a dataset
//! - [`IndividualFairnessEvaluator`] - sampled pairwise similarity test
//! - [`FairnessReportAggregator`] - overall score, violations and recommendations

mod comparator;
mod config;
mod evaluator;
mod group;
mod individual;
mod report;

pub use comparator::FairnessMetrics;
pub use config::{
    FairnessConfig, FairnessThresholds, IndividualFairnessConfig, ViolationPenalties,
    DEFAULT_LABEL_COLUMN, DEFAULT_SENSITIVE_FEATURES,
};
pub use evaluator::{AttributeFairness, GroupFairness, GroupFairnessEvaluator};
pub use group::{ConfusionCounts, GroupMetrics};
pub use individual::{IndividualFairnessEvaluator, IndividualFairnessResult};
pub use report::{
    FairnessReport, FairnessReportAggregator, FairnessSummary, FairnessViolation,
    MAX_FAIRNESS_SCORE,
};

use crate::error::Result;
use crate::utils::column_to_array;
use ndarray::Array1;
use polars::prelude::DataFrame;
use tracing::{info, warn};

pub const NO_SENSITIVE_FEATURES_WARNING: &str = "No sensitive features found for fairness evaluation";
pub const NO_TRUE_LABELS_WARNING: &str = "No true labels found for fairness evaluation";

/// Main fairness evaluator
#[derive(Debug, Clone, Default)]
pub struct FairnessEvaluator {
    config: FairnessConfig,
}

impl FairnessEvaluator {
    /// Create a new fairness evaluator
    pub fn new(config: FairnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FairnessConfig {
        &self.config
    }

    /// Full fairness report over index-aligned arrays.
    ///
    /// Group fairness is computed for the configured sensitive attributes
    /// found in `features`. Individual fairness uses every numeric column
    /// except the sensitive attributes; the label column is dropped as well
    /// when [`IndividualFairnessConfig::exclude_label`] is set.
    pub fn generate_report(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        scores: &Array1<f64>,
        features: &DataFrame,
    ) -> Result<FairnessReport> {
        let sensitive = self.config.sensitive_features.clone();

        let group_fairness = GroupFairnessEvaluator::new(sensitive.clone())
            .evaluate(y_true, y_pred, scores, features)?;

        let mut excluded = sensitive;
        if self.config.individual.exclude_label {
            excluded.push(self.config.label_column.clone());
        }
        let individual_fairness = IndividualFairnessEvaluator::new(self.config.individual.clone())
            .evaluate(features, scores, &excluded)?;

        let report = FairnessReportAggregator::new(
            self.config.thresholds.clone(),
            self.config.penalties.clone(),
        )
        .aggregate(group_fairness, individual_fairness, y_true.len());

        info!(
            score = report.overall_score,
            is_fair = report.is_fair,
            violations = report.violations.len(),
            "Fairness evaluation complete"
        );
        Ok(report)
    }

    /// Evaluate a test dataset that carries its true labels in the
    /// configured label column.
    ///
    /// With no configured sensitive attributes, the columns of
    /// [`DEFAULT_SENSITIVE_FEATURES`] present in the dataset are used. When no
    /// sensitive attribute or no label is available the returned report is
    /// fair with a full score and a warning.
    pub fn evaluate_dataset(
        &self,
        test_df: &DataFrame,
        predictions: &Array1<f64>,
        scores: &Array1<f64>,
    ) -> Result<FairnessReport> {
        let sensitive: Vec<String> = if self.config.sensitive_features.is_empty() {
            DEFAULT_SENSITIVE_FEATURES
                .iter()
                .filter(|f| test_df.column(f).is_ok())
                .map(|f| f.to_string())
                .collect()
        } else {
            self.config.sensitive_features.clone()
        };

        if sensitive.is_empty() {
            warn!("{}", NO_SENSITIVE_FEATURES_WARNING);
            return Ok(FairnessReport::skipped(NO_SENSITIVE_FEATURES_WARNING));
        }

        let label = self.config.label_column.as_str();
        if test_df.column(label).is_err() || test_df.height() == 0 {
            warn!(label_column = %label, "{}", NO_TRUE_LABELS_WARNING);
            return Ok(FairnessReport::skipped(NO_TRUE_LABELS_WARNING));
        }
        let y_true = column_to_array(test_df, label)?;

        let evaluator = FairnessEvaluator::new(FairnessConfig {
            sensitive_features: sensitive,
            ..self.config.clone()
        });
        evaluator.generate_report(&y_true, predictions, scores, test_df)
    }
}

/// Evaluate a test dataset with the default policy.
///
/// # Arguments
/// * `test_df` - Test data with features and a `y` label column
/// * `predictions` - Binary predictions
/// * `scores` - Prediction scores in [0, 1]
/// * `sensitive_features` - Attributes to audit; `None` selects the defaults present in `test_df`
pub fn evaluate_model_fairness(
    test_df: &DataFrame,
    predictions: &Array1<f64>,
    scores: &Array1<f64>,
    sensitive_features: Option<Vec<String>>,
) -> Result<FairnessReport> {
    let config = FairnessConfig::default().with_sensitive_features(sensitive_features.unwrap_or_default());
    FairnessEvaluator::new(config).evaluate_dataset(test_df, predictions, scores)
}
