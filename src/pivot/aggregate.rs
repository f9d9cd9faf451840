//! The aggregation fold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::coerce::coerce;
use super::error::PivotResult;
use super::key::KeyBuilder;
use super::spec::{Aggregation, PivotSpec, ResolvedSpec};
use crate::model::Dataset;

/// Row-key -> column-key -> accumulated value.
///
/// A cell missing from the result is zero, not "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationResult {
    cells: BTreeMap<String, BTreeMap<String, f64>>,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result by accumulating `(row, column, amount)` triples.
    pub fn from_cells<I, R, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = (R, C, f64)>,
        R: Into<String>,
        C: Into<String>,
    {
        let mut result = Self::new();
        for (row, column, amount) in cells {
            result.accumulate(row.into(), column.into(), amount);
        }
        result
    }

    /// Add `amount` to a cell, creating it at zero first.
    pub fn accumulate(&mut self, row_key: String, column_key: String, amount: f64) {
        *self
            .cells
            .entry(row_key)
            .or_default()
            .entry(column_key)
            .or_insert(0.0) += amount;
    }

    pub fn get(&self, row_key: &str, column_key: &str) -> Option<f64> {
        self.cells.get(row_key)?.get(column_key).copied()
    }

    /// Cell value with absent cells read as zero.
    pub fn value(&self, row_key: &str, column_key: &str) -> f64 {
        self.get(row_key, column_key).unwrap_or(0.0)
    }

    pub fn contains(&self, row_key: &str, column_key: &str) -> bool {
        self.get(row_key, column_key).is_some()
    }

    pub fn row(&self, row_key: &str) -> Option<&BTreeMap<String, f64>> {
        self.cells.get(row_key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every stored cell as `(row_key, column_key, value)`.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.cells.iter().flat_map(|(row, columns)| {
            columns
                .iter()
                .map(move |(column, value)| (row.as_str(), column.as_str(), *value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// Sum over all stored cells.
    pub fn total(&self) -> f64 {
        self.cells().map(|(_, _, value)| value).sum()
    }
}

/// Fold `dataset` under `spec`.
///
/// Fails only when `spec` names fields the dataset does not have.
pub fn aggregate(dataset: &Dataset, spec: &PivotSpec) -> PivotResult<AggregationResult> {
    if dataset.is_empty() {
        spec.validate_for(dataset)?;
        return Ok(AggregationResult::new());
    }
    let resolved = spec.resolve(dataset.schema())?;
    Ok(aggregate_resolved(dataset, &resolved))
}

/// Fold `dataset` under an already resolved spec in one pass.
pub fn aggregate_resolved(dataset: &Dataset, spec: &ResolvedSpec) -> AggregationResult {
    let row_keys = KeyBuilder::new(spec.rows.clone(), spec.date_bucket, dataset.date_format());
    let column_keys = KeyBuilder::new(spec.columns.clone(), spec.date_bucket, dataset.date_format());

    let mut result = AggregationResult::new();
    for row in dataset.rows() {
        let amount = match spec.aggregation {
            Aggregation::Sum => coerce(row.get(spec.value)),
            Aggregation::Count => 1.0,
        };
        result.accumulate(row_keys.build(row), column_keys.build(row), amount);
    }
    result
}
