//! Overall fairness assessment: score, violations and recommendations

use super::config::{FairnessThresholds, ViolationPenalties};
use super::evaluator::GroupFairness;
use super::individual::IndividualFairnessResult;
use crate::error::{FairnessError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Score of a model with no detected violations
pub const MAX_FAIRNESS_SCORE: f64 = 100.0;

pub const RECOMMEND_FAIR: &str = "Model appears to be fair across evaluated metrics.";
pub const RECOMMEND_POST_PROCESSING: &str =
    "Consider post-processing techniques to equalize selection rates across groups.";
pub const RECOMMEND_IN_PROCESSING: &str =
    "Consider adversarial debiasing or constraint-based optimization during training.";
pub const RECOMMEND_FEATURE_REVIEW: &str =
    "Review feature engineering to ensure similar individuals are treated similarly.";
pub const RECOMMEND_MONITORING: &str =
    "Regularly monitor fairness metrics in production to detect drift in model fairness.";

/// A detected fairness violation. Serialized as its display message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FairnessViolation {
    /// Selection rates differ too much across groups of the attribute
    DemographicParity(String),
    /// TPR or FPR differ too much across groups of the attribute
    EqualizedOdds(String),
    /// TPR differs too much across groups of the attribute
    EqualOpportunity(String),
    /// Too many similar individuals received dissimilar scores
    IndividualFairness,
}

const DEMOGRAPHIC_PARITY_PREFIX: &str = "Demographic parity violation in ";
const EQUALIZED_ODDS_PREFIX: &str = "Equalized odds violation in ";
const EQUAL_OPPORTUNITY_PREFIX: &str = "Equal opportunity violation in ";
const INDIVIDUAL_FAIRNESS_MESSAGE: &str = "High individual fairness violation rate";

impl FairnessViolation {
    /// Attribute the violation was found in, if it is group-level
    pub fn attribute(&self) -> Option<&str> {
        match self {
            FairnessViolation::DemographicParity(a)
            | FairnessViolation::EqualizedOdds(a)
            | FairnessViolation::EqualOpportunity(a) => Some(a),
            FairnessViolation::IndividualFairness => None,
        }
    }
}

impl fmt::Display for FairnessViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessViolation::DemographicParity(a) => write!(f, "{}{}", DEMOGRAPHIC_PARITY_PREFIX, a),
            FairnessViolation::EqualizedOdds(a) => write!(f, "{}{}", EQUALIZED_ODDS_PREFIX, a),
            FairnessViolation::EqualOpportunity(a) => write!(f, "{}{}", EQUAL_OPPORTUNITY_PREFIX, a),
            FairnessViolation::IndividualFairness => f.write_str(INDIVIDUAL_FAIRNESS_MESSAGE),
        }
    }
}

impl From<FairnessViolation> for String {
    fn from(v: FairnessViolation) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for FairnessViolation {
    type Error = FairnessError;

    fn try_from(s: String) -> Result<Self> {
        if s == INDIVIDUAL_FAIRNESS_MESSAGE {
            return Ok(FairnessViolation::IndividualFairness);
        }
        if let Some(a) = s.strip_prefix(DEMOGRAPHIC_PARITY_PREFIX) {
            return Ok(FairnessViolation::DemographicParity(a.to_string()));
        }
        if let Some(a) = s.strip_prefix(EQUALIZED_ODDS_PREFIX) {
            return Ok(FairnessViolation::EqualizedOdds(a.to_string()));
        }
        if let Some(a) = s.strip_prefix(EQUAL_OPPORTUNITY_PREFIX) {
            return Ok(FairnessViolation::EqualOpportunity(a.to_string()));
        }
        Err(FairnessError::SerializationError(format!(
            "unrecognized fairness violation: {}",
            s
        )))
    }
}

/// Summary statistics for the fairness report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FairnessSummary {
    pub total_samples: usize,
    pub num_attributes: usize,
    pub num_groups: usize,
    pub num_violations: usize,
    pub worst_demographic_parity_difference: f64,
    pub worst_equalized_odds_difference: f64,
}

/// Complete fairness evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessReport {
    /// Group metrics and disparities per sensitive attribute
    pub group_fairness: GroupFairness,
    /// Pairwise similarity test result
    pub individual_fairness: IndividualFairnessResult,
    /// Detected violations, in detection order
    pub violations: Vec<FairnessViolation>,
    /// 100 minus penalties, floored at 0
    pub overall_score: f64,
    /// True iff no violation was detected
    pub is_fair: bool,
    pub recommendations: Vec<String>,
    /// Set when the evaluation could not run on the given data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub summary: FairnessSummary,
    pub generated_at: DateTime<Utc>,
}

impl FairnessReport {
    /// Report for data that could not be evaluated. Fails open: fair, full score.
    pub fn skipped(warning: impl Into<String>) -> Self {
        Self {
            group_fairness: GroupFairness::default(),
            individual_fairness: IndividualFairnessResult::default(),
            violations: Vec::new(),
            overall_score: MAX_FAIRNESS_SCORE,
            is_fair: true,
            recommendations: Vec::new(),
            warning: Some(warning.into()),
            summary: FairnessSummary::default(),
            generated_at: Utc::now(),
        }
    }

    /// Violation messages, in detection order
    pub fn violation_messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Turns group and individual results into a scored report
#[derive(Debug, Clone, Default)]
pub struct FairnessReportAggregator {
    thresholds: FairnessThresholds,
    penalties: ViolationPenalties,
}

impl FairnessReportAggregator {
    pub fn new(thresholds: FairnessThresholds, penalties: ViolationPenalties) -> Self {
        Self { thresholds, penalties }
    }

    /// Build the report. `total_samples` is only used for the summary.
    pub fn aggregate(
        &self,
        group_fairness: GroupFairness,
        individual_fairness: IndividualFairnessResult,
        total_samples: usize,
    ) -> FairnessReport {
        let t = &self.thresholds;
        let p = &self.penalties;
        let mut violations = Vec::new();
        let mut score = MAX_FAIRNESS_SCORE;

        for attr in &group_fairness {
            let Some(fm) = &attr.fairness_metrics else { continue };

            if fm.demographic_parity_difference > t.demographic_parity_max {
                violations.push(FairnessViolation::DemographicParity(attr.attribute.clone()));
                score -= p.demographic_parity;
            }
            if fm.equalized_odds_difference > t.equalized_odds_max {
                violations.push(FairnessViolation::EqualizedOdds(attr.attribute.clone()));
                score -= p.equalized_odds;
            }
            if fm.equal_opportunity_difference > t.equal_opportunity_max {
                violations.push(FairnessViolation::EqualOpportunity(attr.attribute.clone()));
                score -= p.equal_opportunity;
            }
        }

        if individual_fairness.violation_rate > t.individual_violation_max {
            violations.push(FairnessViolation::IndividualFairness);
            score -= p.individual_fairness;
        }

        let overall_score = score.max(0.0);
        for v in &violations {
            info!(violation = %v, "Fairness violation detected");
        }

        let recommendations = self.recommendations(&violations, &group_fairness);
        let summary = summarize(&group_fairness, violations.len(), total_samples);

        FairnessReport {
            group_fairness,
            individual_fairness,
            is_fair: violations.is_empty(),
            violations,
            overall_score,
            recommendations,
            warning: None,
            summary,
            generated_at: Utc::now(),
        }
    }

    /// Actionable recommendations for the detected violations
    pub fn recommendations(
        &self,
        violations: &[FairnessViolation],
        group_fairness: &GroupFairness,
    ) -> Vec<String> {
        if violations.is_empty() {
            return vec![RECOMMEND_FAIR.to_string()];
        }

        let mut recommendations = Vec::new();
        let any = |pred: fn(&FairnessViolation) -> bool| violations.iter().any(pred);

        if any(|v| matches!(v, FairnessViolation::DemographicParity(_))) {
            recommendations.push(RECOMMEND_POST_PROCESSING.to_string());
        }
        if any(|v| matches!(v, FairnessViolation::EqualizedOdds(_))) {
            recommendations.push(RECOMMEND_IN_PROCESSING.to_string());
        }
        if any(|v| matches!(v, FairnessViolation::IndividualFairness)) {
            recommendations.push(RECOMMEND_FEATURE_REVIEW.to_string());
        }

        for attr in group_fairness {
            let Some((smallest, largest)) = attr.group_size_extremes() else { continue };
            if largest > 0
                && (smallest as f64 / largest as f64) < self.thresholds.group_imbalance_min_ratio
            {
                recommendations.push(format!(
                    "Consider stratified sampling for {} to balance group representation.",
                    attr.attribute
                ));
            }
        }

        recommendations.push(RECOMMEND_MONITORING.to_string());
        recommendations
    }
}

fn summarize(group_fairness: &GroupFairness, num_violations: usize, total_samples: usize) -> FairnessSummary {
    let metrics = || group_fairness.iter().filter_map(|a| a.fairness_metrics.as_ref());
    FairnessSummary {
        total_samples,
        num_attributes: group_fairness.len(),
        num_groups: group_fairness.iter().map(|a| a.group_metrics.len()).sum(),
        num_violations,
        worst_demographic_parity_difference: metrics()
            .map(|m| m.demographic_parity_difference)
            .fold(0.0, f64::max),
        worst_equalized_odds_difference: metrics()
            .map(|m| m.equalized_odds_difference)
            .fold(0.0, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::evaluator::GroupFairnessEvaluator;
    use ndarray::Array1;
    use polars::prelude::*;

    /// Group "a" selected at 0.8, group "b" at 0.3, perfect TPR/FPR parity
    fn parity_gap() -> GroupFairness {
        let mut labels = vec![1.0; 8];
        labels.extend([0.0; 2]);
        labels.extend([1.0; 3]);
        labels.extend([0.0; 7]);
        let labels = Array1::from(labels);

        let mut groups = vec!["a"; 10];
        groups.extend(["b"; 10]);
        let df = df!("X" => &groups).unwrap();

        GroupFairnessEvaluator::new(vec!["X".to_string()])
            .evaluate(&labels, &labels, &labels, &df)
            .unwrap()
    }

    #[test]
    fn test_demographic_parity_only() {
        let gf = parity_gap();
        let fm = gf.get("X").unwrap().fairness_metrics.clone().unwrap();
        assert!((fm.demographic_parity_difference - 0.5).abs() < 1e-10);
        assert_eq!(fm.equalized_odds_difference, 0.0);

        let report = FairnessReportAggregator::default().aggregate(
            gf,
            IndividualFairnessResult::default(),
            20,
        );

        assert_eq!(report.violation_messages(), vec!["Demographic parity violation in X"]);
        assert_eq!(report.overall_score, 85.0);
        assert!(!report.is_fair);
        assert_eq!(
            report.recommendations,
            vec![RECOMMEND_POST_PROCESSING.to_string(), RECOMMEND_MONITORING.to_string()]
        );
    }

    /// Two groups of eight rows, group "a" first
    fn two_groups(y_true: [f64; 16], y_pred: [f64; 16]) -> GroupFairness {
        let mut groups = vec!["a"; 8];
        groups.extend(["b"; 8]);
        let df = df!("Age" => &groups).unwrap();
        let y_true = Array1::from(y_true.to_vec());
        let y_pred = Array1::from(y_pred.to_vec());

        GroupFairnessEvaluator::new(vec!["Age".to_string()])
            .evaluate(&y_true, &y_pred, &y_pred, &df)
            .unwrap()
    }

    #[test]
    fn test_all_group_violations_accumulate() {
        // a: TPR 1, FPR 0, selected 0.5; b: TPR 0.25, FPR 1, selected 0.625
        let gf = two_groups(
            [1., 1., 1., 1., 0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 0.],
            [1., 1., 1., 1., 0., 0., 0., 0., 1., 0., 0., 0., 1., 1., 1., 1.],
        );
        let fm = gf.get("Age").unwrap().fairness_metrics.clone().unwrap();
        assert!((fm.demographic_parity_difference - 0.125).abs() < 1e-10);
        assert!((fm.equalized_odds_difference - 1.0).abs() < 1e-10);
        assert!((fm.equal_opportunity_difference - 0.75).abs() < 1e-10);

        let report = FairnessReportAggregator::default().aggregate(
            gf,
            IndividualFairnessResult::default(),
            16,
        );

        assert_eq!(
            report.violation_messages(),
            vec![
                "Demographic parity violation in Age",
                "Equalized odds violation in Age",
                "Equal opportunity violation in Age",
            ]
        );
        assert_eq!(report.overall_score, 60.0);
        assert!(!report.is_fair);
        assert_eq!(
            report.recommendations,
            vec![
                RECOMMEND_POST_PROCESSING.to_string(),
                RECOMMEND_IN_PROCESSING.to_string(),
                RECOMMEND_MONITORING.to_string(),
            ]
        );
    }

    #[test]
    fn test_false_positive_gap_alone_breaks_equalized_odds() {
        // Same selection rate and TPR; b has FPR 1/3 from its lower base rate
        let gf = two_groups(
            [1., 1., 1., 1., 0., 0., 0., 0., 1., 1., 0., 0., 0., 0., 0., 0.],
            [1., 1., 1., 1., 0., 0., 0., 0., 1., 1., 1., 1., 0., 0., 0., 0.],
        );
        let report = FairnessReportAggregator::default().aggregate(
            gf,
            IndividualFairnessResult::default(),
            16,
        );

        assert_eq!(
            report.violations,
            vec![FairnessViolation::EqualizedOdds("Age".to_string())]
        );
        assert_eq!(report.overall_score, 85.0);
        assert_eq!(
            report.recommendations,
            vec![RECOMMEND_IN_PROCESSING.to_string(), RECOMMEND_MONITORING.to_string()]
        );
    }

    #[test]
    fn test_fair_report_has_single_recommendation() {
        let report = FairnessReportAggregator::default().aggregate(
            GroupFairness::default(),
            IndividualFairnessResult::default(),
            0,
        );
        assert!(report.is_fair);
        assert_eq!(report.overall_score, 100.0);
        assert_eq!(report.recommendations, vec![RECOMMEND_FAIR.to_string()]);
    }

    #[test]
    fn test_individual_violation_penalty() {
        let individual = IndividualFairnessResult {
            violation_rate: 0.5,
            pairs_evaluated: 4,
            sample_size: 10,
        };
        let report = FairnessReportAggregator::default().aggregate(GroupFairness::default(), individual, 10);

        assert_eq!(report.violations, vec![FairnessViolation::IndividualFairness]);
        assert_eq!(report.overall_score, 80.0);
        assert_eq!(
            report.recommendations,
            vec![RECOMMEND_FEATURE_REVIEW.to_string(), RECOMMEND_MONITORING.to_string()]
        );
    }

    #[test]
    fn test_violation_rate_at_threshold_is_not_a_violation() {
        let individual = IndividualFairnessResult {
            violation_rate: 0.2,
            pairs_evaluated: 5,
            sample_size: 10,
        };
        let report = FairnessReportAggregator::default().aggregate(GroupFairness::default(), individual, 10);
        assert!(report.is_fair);
    }

    #[test]
    fn test_score_floored_at_zero() {
        let penalties = ViolationPenalties {
            individual_fairness: 250.0,
            ..ViolationPenalties::default()
        };
        let individual = IndividualFairnessResult {
            violation_rate: 1.0,
            pairs_evaluated: 1,
            sample_size: 2,
        };
        let report = FairnessReportAggregator::new(FairnessThresholds::default(), penalties)
            .aggregate(GroupFairness::default(), individual, 2);
        assert_eq!(report.overall_score, 0.0);
    }

    #[test]
    fn test_imbalanced_groups_recommend_stratified_sampling() {
        // 1 row in group "rare" vs 20 in "common"
        let n = 21;
        let mut groups = vec!["common"; 20];
        groups.push("rare");
        let df = df!("ForeignWorker" => &groups).unwrap();
        let mut y_pred = vec![0.0; 20];
        y_pred.push(1.0);
        let y_pred = Array1::from(y_pred);
        let y_true = Array1::from_elem(n, 1.0);

        let gf = GroupFairnessEvaluator::new(vec!["ForeignWorker".to_string()])
            .evaluate(&y_true, &y_pred, &y_pred, &df)
            .unwrap();
        let report = FairnessReportAggregator::default().aggregate(gf, IndividualFairnessResult::default(), n);

        assert!(report
            .recommendations
            .iter()
            .any(|r| r == "Consider stratified sampling for ForeignWorker to balance group representation."));
        assert_eq!(report.recommendations.last().unwrap(), RECOMMEND_MONITORING);
    }

    #[test]
    fn test_violation_string_roundtrip() {
        let v = FairnessViolation::EqualOpportunity("Age".to_string());
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"Equal opportunity violation in Age\"");
        let back: FairnessViolation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.attribute(), Some("Age"));
    }

    #[test]
    fn test_unknown_violation_string_rejected() {
        assert!(FairnessViolation::try_from("something else".to_string()).is_err());
    }

    #[test]
    fn test_skipped_report() {
        let report = FairnessReport::skipped("No sensitive features found for fairness evaluation");
        assert!(report.is_fair);
        assert_eq!(report.overall_score, 100.0);
        assert!(report.warning.is_some());
        assert!(report.to_json_pretty().unwrap().contains("warning"));
    }
}
