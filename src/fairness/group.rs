//! Per-group confusion-matrix rates

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

const LABEL_EPS: f64 = 1e-10;

/// Rates for one group of one sensitive attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    /// Number of samples in this group
    pub count: usize,
    /// Selection rate (mean of predicted labels)
    pub positive_rate: f64,
    /// True positive rate (recall)
    pub true_positive_rate: f64,
    /// False positive rate
    pub false_positive_rate: f64,
    /// Positive predictive value
    pub precision: f64,
    /// Proportion of actual positives in this group
    pub base_rate: f64,
    /// Mean prediction score
    pub mean_score: f64,
}

/// Confusion counts against the fixed label order {0, 1}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionCounts {
    /// Count outcomes. Pairs where either side is not exactly 0 or 1 are ignored.
    pub fn from_labels(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (as_binary(t), as_binary(p)) {
                (Some(true), Some(true)) => counts.tp += 1,
                (Some(false), Some(true)) => counts.fp += 1,
                (Some(false), Some(false)) => counts.tn += 1,
                (Some(true), Some(false)) => counts.fn_ += 1,
                _ => {}
            }
        }
        counts
    }
}

fn as_binary(value: f64) -> Option<bool> {
    if (value - 1.0).abs() < LABEL_EPS {
        Some(true)
    } else if value.abs() < LABEL_EPS {
        Some(false)
    } else {
        None
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

fn mean(values: ArrayView1<f64>) -> f64 {
    values.mean().unwrap_or(0.0)
}

impl GroupMetrics {
    /// Compute the rates for one group.
    ///
    /// All three views must have the same length. An empty group yields a
    /// record with `count == 0` and every rate at 0.
    pub fn compute(
        y_true: ArrayView1<f64>,
        y_pred: ArrayView1<f64>,
        scores: ArrayView1<f64>,
    ) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        debug_assert_eq!(y_true.len(), scores.len());

        if y_true.is_empty() {
            return Self::default();
        }

        let c = ConfusionCounts::from_labels(y_true, y_pred);

        Self {
            count: y_true.len(),
            positive_rate: mean(y_pred),
            true_positive_rate: ratio(c.tp, c.tp + c.fn_),
            false_positive_rate: ratio(c.fp, c.fp + c.tn),
            precision: ratio(c.tp, c.tp + c.fp),
            base_rate: mean(y_true),
            mean_score: mean(scores),
        }
    }

    /// True when the group had no samples
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_perfect_predictions() {
        let y_true = array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let y_pred = array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let scores = array![0.9, 0.8, 0.7, 0.1, 0.2, 0.3];

        let counts = ConfusionCounts::from_labels(y_true.view(), y_pred.view());
        assert_eq!(counts, ConfusionCounts { tn: 3, fp: 0, fn_: 0, tp: 3 });

        let m = GroupMetrics::compute(y_true.view(), y_pred.view(), scores.view());
        assert_eq!(m.count, 6);
        assert_eq!(m.true_positive_rate, 1.0);
        assert_eq!(m.false_positive_rate, 0.0);
        assert_eq!(m.precision, 1.0);
        assert!((m.positive_rate - 0.5).abs() < 1e-10);
        assert!((m.base_rate - 0.5).abs() < 1e-10);
        assert!((m.mean_score - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_empty_group_yields_zero_rates() {
        let empty: Array1<f64> = Array1::zeros(0);
        let m = GroupMetrics::compute(empty.view(), empty.view(), empty.view());

        assert!(m.is_empty());
        assert_eq!(m.positive_rate, 0.0);
        assert_eq!(m.true_positive_rate, 0.0);
        assert_eq!(m.false_positive_rate, 0.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.base_rate, 0.0);
        assert_eq!(m.mean_score, 0.0);
    }

    #[test]
    fn test_absent_positive_class_has_zero_denominators() {
        // No actual positives and no predicted positives
        let y_true = array![0.0, 0.0, 0.0];
        let y_pred = array![0.0, 0.0, 0.0];
        let scores = array![0.1, 0.2, 0.3];

        let m = GroupMetrics::compute(y_true.view(), y_pred.view(), scores.view());
        assert_eq!(m.true_positive_rate, 0.0);
        assert_eq!(m.false_positive_rate, 0.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.positive_rate, 0.0);
    }

    #[test]
    fn test_mixed_errors() {
        // tp=1, fn=1, fp=1, tn=1
        let y_true = array![1.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0];
        let scores = array![0.9, 0.4, 0.6, 0.2];

        let m = GroupMetrics::compute(y_true.view(), y_pred.view(), scores.view());
        assert!((m.true_positive_rate - 0.5).abs() < 1e-10);
        assert!((m.false_positive_rate - 0.5).abs() < 1e-10);
        assert!((m.precision - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_non_binary_labels_ignored_in_confusion() {
        let y_true = array![1.0, 2.0];
        let y_pred = array![1.0, 1.0];
        let counts = ConfusionCounts::from_labels(y_true.view(), y_pred.view());
        assert_eq!(counts.tp, 1);
        assert_eq!(counts.fp, 0);
    }
}
