//! Credit Fairness - fairness evaluation for credit scoring models
//!
//! This crate audits the predictions of a credit scoring model:
//! - Group fairness: demographic parity, equalized odds, equal opportunity
//!   and precision parity across the groups of each sensitive attribute
//! - Individual fairness: similar applicants should receive similar scores
//! - An overall 0-100 fairness score with violations and recommendations
//!
//! # Modules
//!
//! - [`fairness`] - Group/individual evaluation and report aggregation
//! - [`utils`] - Dataset loading and column extraction
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use credit_fairness::prelude::*;
//!
//! # fn main() -> credit_fairness::Result<()> {
//! let df = load_data("german_credit_test.csv")?;
//! let scores = column_to_array(&df, "score")?;
//! let predictions = predictions_from_scores(&scores, 0.5);
//!
//! let evaluator = FairnessEvaluator::new(FairnessConfig::default().with_seed(42));
//! let report = evaluator.evaluate_dataset(&df, &predictions, &scores)?;
//! println!("fairness score: {}", report.overall_score);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

pub mod fairness;
pub mod utils;

// Services
pub mod cli;

pub use error::{FairnessError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{FairnessError, Result};

    pub use crate::fairness::{
        evaluate_model_fairness, FairnessConfig, FairnessEvaluator, FairnessMetrics,
        FairnessReport, FairnessReportAggregator, FairnessThresholds, FairnessViolation,
        GroupFairnessEvaluator, GroupMetrics, IndividualFairnessConfig,
        IndividualFairnessEvaluator, IndividualFairnessResult, ViolationPenalties,
    };

    pub use crate::utils::{column_to_array, load_data, predictions_from_scores};
}
