//! Group fairness over the sensitive attributes of a dataset

use super::comparator::FairnessMetrics;
use super::group::GroupMetrics;
use crate::error::{FairnessError, Result};
use ndarray::{Array1, Axis};
use polars::prelude::*;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// Group metrics and disparities for one sensitive attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeFairness {
    /// Name of the sensitive attribute
    pub attribute: String,
    /// Metrics keyed by group value
    pub group_metrics: BTreeMap<String, GroupMetrics>,
    /// Disparities, `None` when fewer than two groups were populated
    pub fairness_metrics: Option<FairnessMetrics>,
}

impl AttributeFairness {
    /// Smallest and largest group sizes
    pub fn group_size_extremes(&self) -> Option<(usize, usize)> {
        let min = self.group_metrics.values().map(|m| m.count).min()?;
        let max = self.group_metrics.values().map(|m| m.count).max()?;
        Some((min, max))
    }
}

/// Per-attribute results, in the order the attributes were evaluated.
///
/// Serialized as a JSON object keyed by attribute name, with entries in
/// evaluation order.
#[derive(Debug, Clone, Default)]
pub struct GroupFairness(Vec<AttributeFairness>);

#[derive(Serialize)]
struct AttributeEntryRef<'a> {
    group_metrics: &'a BTreeMap<String, GroupMetrics>,
    fairness_metrics: &'a Option<FairnessMetrics>,
}

#[derive(Deserialize)]
struct AttributeEntry {
    group_metrics: BTreeMap<String, GroupMetrics>,
    #[serde(default)]
    fairness_metrics: Option<FairnessMetrics>,
}

impl Serialize for GroupFairness {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in &self.0 {
            map.serialize_entry(
                &attr.attribute,
                &AttributeEntryRef {
                    group_metrics: &attr.group_metrics,
                    fairness_metrics: &attr.fairness_metrics,
                },
            )?;
        }
        map.end()
    }
}

struct GroupFairnessVisitor;

impl<'de> Visitor<'de> for GroupFairnessVisitor {
    type Value = GroupFairness;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of attribute name to group fairness")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut attributes = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((attribute, entry)) = access.next_entry::<String, AttributeEntry>()? {
            attributes.push(AttributeFairness {
                attribute,
                group_metrics: entry.group_metrics,
                fairness_metrics: entry.fairness_metrics,
            });
        }
        Ok(GroupFairness(attributes))
    }
}

impl<'de> Deserialize<'de> for GroupFairness {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(GroupFairnessVisitor)
    }
}

impl GroupFairness {
    pub fn get(&self, attribute: &str) -> Option<&AttributeFairness> {
        self.0.iter().find(|a| a.attribute == attribute)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeFairness> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attribute names, in evaluation order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.attribute.as_str())
    }
}

impl<'a> IntoIterator for &'a GroupFairness {
    type Item = &'a AttributeFairness;
    type IntoIter = std::slice::Iter<'a, AttributeFairness>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Evaluates group fairness for a fixed list of sensitive attributes
#[derive(Debug, Clone)]
pub struct GroupFairnessEvaluator {
    sensitive_features: Vec<String>,
}

impl GroupFairnessEvaluator {
    pub fn new(sensitive_features: Vec<String>) -> Self {
        Self { sensitive_features }
    }

    pub fn sensitive_features(&self) -> &[String] {
        &self.sensitive_features
    }

    /// Compute group metrics and disparities for every sensitive attribute
    /// present as a column of `features`. Absent attributes are skipped.
    ///
    /// # Arguments
    /// * `y_true` - Ground truth 0/1 labels
    /// * `y_pred` - Predicted 0/1 labels
    /// * `scores` - Prediction scores in [0, 1]
    /// * `features` - Feature table, one row per sample
    pub fn evaluate(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        scores: &Array1<f64>,
        features: &DataFrame,
    ) -> Result<GroupFairness> {
        let n = y_true.len();
        if y_pred.len() != n {
            return Err(FairnessError::length_mismatch("predictions", n, y_pred.len()));
        }
        if scores.len() != n {
            return Err(FairnessError::length_mismatch("scores", n, scores.len()));
        }
        if features.height() != n {
            return Err(FairnessError::length_mismatch("feature table", n, features.height()));
        }

        let mut results = Vec::with_capacity(self.sensitive_features.len());

        for attribute in &self.sensitive_features {
            let Ok(column) = features.column(attribute) else {
                warn!(attribute = %attribute, "Sensitive attribute not in feature table, skipping");
                continue;
            };

            let mut group_metrics = BTreeMap::new();
            for (value, indices) in partition_by_value(column)? {
                if indices.is_empty() {
                    continue;
                }
                let metrics = GroupMetrics::compute(
                    y_true.select(Axis(0), &indices).view(),
                    y_pred.select(Axis(0), &indices).view(),
                    scores.select(Axis(0), &indices).view(),
                );
                group_metrics.insert(value, metrics);
            }

            let fairness_metrics = FairnessMetrics::compare(&group_metrics);
            debug!(
                attribute = %attribute,
                groups = group_metrics.len(),
                comparable = fairness_metrics.is_some(),
                "Evaluated group fairness"
            );

            results.push(AttributeFairness {
                attribute: attribute.clone(),
                group_metrics,
                fairness_metrics,
            });
        }

        Ok(GroupFairness(results))
    }
}

/// Row indices for each distinct non-null value of a column, keyed by the
/// value rendered as a string. Groups appear in first-seen order.
fn partition_by_value(column: &Column) -> Result<Vec<(String, Vec<usize>)>> {
    let as_str = column.cast(&DataType::String)?;
    let values = as_str.as_materialized_series().str()?;

    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

    for (row, value) in values.into_iter().enumerate() {
        let Some(value) = value else { continue };
        match order.get(value) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                order.insert(value.to_string(), groups.len());
                groups.push((value.to_string(), vec![row]));
            }
        }
    }

    Ok(groups)
}
