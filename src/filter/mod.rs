//! Row filtering ahead of the pivot.
//!
//! Per-field filters and the global search both match case-insensitive
//! substrings of a value's text form. The filtered dataset shares the
//! original schema, so a pivot spec valid for one is valid for the other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Dataset, FieldRef, Row};
use crate::pivot::{FieldRole, PivotError, PivotResult};

/// Field filters plus a free-text search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFilter {
    /// Field name -> needle. Empty needles are ignored.
    pub fields: BTreeMap<String, String>,
    /// Matched against every field of a row.
    pub search: String,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.set_field(field, needle);
        self
    }

    pub fn set_field(&mut self, field: impl Into<String>, needle: impl Into<String>) {
        self.fields.insert(field.into(), needle.into());
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.set_search(query);
        self
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.search.clear();
    }

    /// True when no filter would drop a row.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.fields.values().all(String::is_empty)
    }

    /// Rows of `dataset` passing every field filter and the search.
    pub fn apply(&self, dataset: &Dataset) -> PivotResult<Dataset> {
        if dataset.is_empty() {
            return Ok(dataset.clone());
        }
        let mut needles: Vec<(FieldRef, String)> = Vec::new();
        for (field, needle) in &self.fields {
            let field_ref = dataset
                .field(field)
                .ok_or_else(|| PivotError::unknown_field(FieldRole::Filter, field))?;
            if !needle.is_empty() {
                needles.push((field_ref, needle.to_lowercase()));
            }
        }
        let search = self.search.to_lowercase();

        if needles.is_empty() && search.is_empty() {
            return Ok(dataset.clone());
        }

        let filtered = dataset.retain(|row| {
            needles
                .iter()
                .all(|(field, needle)| value_contains(row, *field, needle))
                && (search.is_empty() || row_contains(row, &search))
        });
        tracing::debug!(
            before = dataset.len(),
            after = filtered.len(),
            "applied row filter"
        );
        Ok(filtered)
    }
}

fn value_contains(row: &Row, field: FieldRef, needle: &str) -> bool {
    row.get(field)
        .as_text()
        .is_some_and(|text| text.to_lowercase().contains(needle))
}

fn row_contains(row: &Row, needle: &str) -> bool {
    row.values().iter().any(|value| {
        value
            .as_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}
