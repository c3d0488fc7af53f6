//! Fairness evaluation configuration

use crate::error::{FairnessError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sensitive attributes audited when the caller names none.
/// Only those present as columns in the dataset are used.
pub const DEFAULT_SENSITIVE_FEATURES: [&str; 3] = ["PersonalStatus", "Age", "ForeignWorker"];

/// Name of the true-label column in a test dataset
pub const DEFAULT_LABEL_COLUMN: &str = "y";

/// Configuration for fairness evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// Names of protected/sensitive attributes. Empty means "use
    /// [`DEFAULT_SENSITIVE_FEATURES`] filtered to the dataset's columns".
    pub sensitive_features: Vec<String>,
    /// Column holding the true 0/1 labels
    pub label_column: String,
    /// Violation thresholds
    pub thresholds: FairnessThresholds,
    /// Score penalties per violation type
    pub penalties: ViolationPenalties,
    /// Individual (similarity-based) fairness settings
    pub individual: IndividualFairnessConfig,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            sensitive_features: Vec::new(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            thresholds: FairnessThresholds::default(),
            penalties: ViolationPenalties::default(),
            individual: IndividualFairnessConfig::default(),
        }
    }
}

impl FairnessConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the sensitive attributes
    pub fn with_sensitive_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the label column
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    /// Builder method to set the thresholds
    pub fn with_thresholds(mut self, thresholds: FairnessThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Builder method to set the penalties
    pub fn with_penalties(mut self, penalties: ViolationPenalties) -> Self {
        self.penalties = penalties;
        self
    }

    /// Builder method to set the individual fairness settings
    pub fn with_individual(mut self, individual: IndividualFairnessConfig) -> Self {
        self.individual = individual;
        self
    }

    /// Builder method to fix the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.individual.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FairnessConfig = serde_json::from_str(json)
            .map_err(|e| FairnessError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Check that every policy value is usable
    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(FairnessError::ConfigError(
                "label_column must not be empty".to_string(),
            ));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("demographic_parity_max", t.demographic_parity_max),
            ("equalized_odds_max", t.equalized_odds_max),
            ("equal_opportunity_max", t.equal_opportunity_max),
            ("individual_violation_max", t.individual_violation_max),
            ("group_imbalance_min_ratio", t.group_imbalance_min_ratio),
            ("distance_threshold", self.individual.distance_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FairnessError::ConfigError(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        let p = &self.penalties;
        for (name, value) in [
            ("demographic_parity", p.demographic_parity),
            ("equalized_odds", p.equalized_odds),
            ("equal_opportunity", p.equal_opportunity),
            ("individual_fairness", p.individual_fairness),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FairnessError::ConfigError(format!(
                    "penalty {} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.individual.max_samples < 2 {
            return Err(FairnessError::ConfigError(format!(
                "max_samples must be at least 2, got {}",
                self.individual.max_samples
            )));
        }

        Ok(())
    }
}

/// Thresholds for determining fairness violations.
/// A metric strictly above its maximum is a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessThresholds {
    /// Maximum acceptable demographic parity difference
    pub demographic_parity_max: f64,
    /// Maximum acceptable equalized odds difference
    pub equalized_odds_max: f64,
    /// Maximum acceptable equal opportunity difference
    pub equal_opportunity_max: f64,
    /// Maximum acceptable individual fairness violation rate
    pub individual_violation_max: f64,
    /// Smallest/largest group size ratio below which stratified sampling is recommended
    pub group_imbalance_min_ratio: f64,
}

impl Default for FairnessThresholds {
    fn default() -> Self {
        Self {
            demographic_parity_max: 0.1,
            equalized_odds_max: 0.1,
            equal_opportunity_max: 0.1,
            individual_violation_max: 0.2,
            group_imbalance_min_ratio: 0.1,
        }
    }
}

/// Points deducted from the overall score of 100 per violation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationPenalties {
    pub demographic_parity: f64,
    pub equalized_odds: f64,
    pub equal_opportunity: f64,
    pub individual_fairness: f64,
}

impl Default for ViolationPenalties {
    fn default() -> Self {
        Self {
            demographic_parity: 15.0,
            equalized_odds: 15.0,
            equal_opportunity: 10.0,
            individual_fairness: 20.0,
        }
    }
}

/// Settings for the similarity-based individual fairness test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualFairnessConfig {
    /// Standardized feature distance at or below which two rows are "similar";
    /// also the maximum tolerated score gap between similar rows
    pub distance_threshold: f64,
    /// Cap on the number of rows sampled for the pairwise scan
    pub max_samples: usize,
    /// Random seed for the row sample (entropy when unset)
    pub seed: Option<u64>,
    /// Also drop the true-label column from the similarity features
    pub exclude_label: bool,
}

impl Default for IndividualFairnessConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.1,
            max_samples: 1000,
            seed: None,
            exclude_label: false,
        }
    }
}

impl IndividualFairnessConfig {
    /// Builder method to set the distance threshold
    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Builder method to cap the sample size
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to keep the label column out of the similarity features
    pub fn with_exclude_label(mut self, exclude: bool) -> Self {
        self.exclude_label = exclude;
        self
    }
}
