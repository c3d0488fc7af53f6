//! Disparity metrics across the groups of one attribute

use super::group::GroupMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Disparities across groups of a single sensitive attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessMetrics {
    /// max(selection rate) - min(selection rate)
    pub demographic_parity_difference: f64,
    /// min(selection rate) / max(selection rate), 0 when the max is 0
    pub demographic_parity_ratio: f64,
    /// max(TPR range, FPR range)
    pub equalized_odds_difference: f64,
    /// TPR range
    pub equal_opportunity_difference: f64,
    /// Precision range
    pub precision_parity_difference: f64,
}

#[derive(Debug, Clone, Copy)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Range { min: v, max: v }),
            Some(r) => Some(Range {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    fn spread(&self) -> f64 {
        self.max - self.min
    }
}

impl FairnessMetrics {
    /// Compare groups keyed by group value.
    ///
    /// Groups with no samples are ignored; `None` when fewer than two
    /// populated groups remain.
    pub fn compare(group_metrics: &BTreeMap<String, GroupMetrics>) -> Option<Self> {
        let groups: Vec<&GroupMetrics> = group_metrics.values().filter(|m| !m.is_empty()).collect();
        if groups.len() < 2 {
            return None;
        }

        let positive = Range::of(groups.iter().map(|m| m.positive_rate))?;
        let tpr = Range::of(groups.iter().map(|m| m.true_positive_rate))?;
        let fpr = Range::of(groups.iter().map(|m| m.false_positive_rate))?;
        let precision = Range::of(groups.iter().map(|m| m.precision))?;

        let demographic_parity_ratio = if positive.max > 0.0 {
            positive.min / positive.max
        } else {
            0.0
        };

        Some(Self {
            demographic_parity_difference: positive.spread(),
            demographic_parity_ratio,
            equalized_odds_difference: tpr.spread().max(fpr.spread()),
            equal_opportunity_difference: tpr.spread(),
            precision_parity_difference: precision.spread(),
        })
    }
}
