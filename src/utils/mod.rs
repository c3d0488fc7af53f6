//! Utility functions and types

pub mod data_loader;

pub use data_loader::{
    column_to_array, drop_existing, load_data, predictions_from_scores, DEFAULT_DECISION_THRESHOLD,
};
