//! Axis label sets for rendering a dense grid.

use serde::Serialize;
use std::collections::HashSet;

use super::error::PivotResult;
use super::key::KeyBuilder;
use super::spec::{PivotSpec, ResolvedSpec};
use crate::model::Dataset;

/// Every distinct row key and column key observed in a dataset, in order of
/// first appearance.
///
/// The two axes are independent: a (row, column) pair need not co-occur in
/// the data, in which case the grid shows a zero cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSets {
    pub row_keys: Vec<String>,
    pub column_keys: Vec<String>,
}

impl AxisSets {
    pub fn derive(dataset: &Dataset, spec: &PivotSpec) -> PivotResult<Self> {
        if dataset.is_empty() {
            spec.validate_for(dataset)?;
            return Ok(Self::default());
        }
        let resolved = spec.resolve(dataset.schema())?;
        Ok(Self::derive_resolved(dataset, &resolved))
    }

    pub fn derive_resolved(dataset: &Dataset, spec: &ResolvedSpec) -> Self {
        let row_builder = KeyBuilder::new(spec.rows.clone(), spec.date_bucket, dataset.date_format());
        let column_builder =
            KeyBuilder::new(spec.columns.clone(), spec.date_bucket, dataset.date_format());

        let mut rows = FirstSeen::default();
        let mut columns = FirstSeen::default();
        for row in dataset.rows() {
            rows.insert(row_builder.build(row));
            columns.insert(column_builder.build(row));
        }

        Self {
            row_keys: rows.keys,
            column_keys: columns.keys,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty() && self.column_keys.is_empty()
    }
}

#[derive(Default)]
struct FirstSeen {
    seen: HashSet<String>,
    keys: Vec<String>,
}

impl FirstSeen {
    fn insert(&mut self, key: String) {
        if !self.seen.contains(&key) {
            self.seen.insert(key.clone());
            self.keys.push(key);
        }
    }
}
