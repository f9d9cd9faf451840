//! Pivot specification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::bucket::DateBucket;
use super::error::{FieldRole, PivotError, PivotResult};
use crate::model::{Dataset, FieldRef, Schema};

/// Fold applied per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            _ => Err(PivotError::UnknownAggregation(s.to_string())),
        }
    }
}

/// What to group by and how to fold each cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotSpec {
    /// Fields grouped into the row key, in order.
    pub row_dimensions: Vec<String>,
    /// Fields grouped into the column key, in order. May be empty.
    #[serde(default)]
    pub column_dimensions: Vec<String>,
    /// Field summed under [`Aggregation::Sum`].
    pub value_field: String,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub date_bucket: DateBucket,
}

impl PivotSpec {
    /// A `sum` pivot over `rows` with no column dimensions and no bucketing.
    pub fn new<I, S>(rows: I, value_field: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            row_dimensions: rows.into_iter().map(Into::into).collect(),
            column_dimensions: Vec::new(),
            value_field: value_field.into(),
            aggregation: Aggregation::default(),
            date_bucket: DateBucket::default(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_dimensions = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_date_bucket(mut self, bucket: DateBucket) -> Self {
        self.date_bucket = bucket;
        self
    }

    /// Label for the row axis (`Entity / Operating status`).
    pub fn row_label(&self) -> String {
        self.row_dimensions.join(super::key::KEY_SEPARATOR)
    }

    /// Resolve every field name against `schema`.
    pub fn resolve(&self, schema: &Schema) -> PivotResult<ResolvedSpec> {
        self.check_shape()?;
        let rows = resolve_fields(schema, &self.row_dimensions, FieldRole::Row)?;
        let columns = resolve_fields(schema, &self.column_dimensions, FieldRole::Column)?;
        let value = schema
            .field(&self.value_field)
            .ok_or_else(|| PivotError::unknown_field(FieldRole::Value, &self.value_field))?;

        Ok(ResolvedSpec {
            rows,
            columns,
            value,
            aggregation: self.aggregation,
            date_bucket: self.date_bucket,
        })
    }

    pub fn validate(&self, schema: &Schema) -> PivotResult<()> {
        self.resolve(schema).map(|_| ())
    }

    /// Validate against the rows the spec will run over.
    ///
    /// A row set with no rows aggregates to nothing whatever fields it names,
    /// and one loaded from `[]` has no fields at all, so only the row
    /// dimension count is checked then.
    pub fn validate_for(&self, dataset: &Dataset) -> PivotResult<()> {
        if dataset.is_empty() {
            self.check_shape()
        } else {
            self.validate(dataset.schema())
        }
    }

    fn check_shape(&self) -> PivotResult<()> {
        if self.row_dimensions.is_empty() {
            return Err(PivotError::NoRowDimensions);
        }
        Ok(())
    }
}

/// A [`PivotSpec`] with field names resolved against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpec {
    pub rows: Vec<FieldRef>,
    pub columns: Vec<FieldRef>,
    pub value: FieldRef,
    pub aggregation: Aggregation,
    pub date_bucket: DateBucket,
}

pub(crate) fn resolve_fields(
    schema: &Schema,
    names: &[String],
    role: FieldRole,
) -> PivotResult<Vec<FieldRef>> {
    names
        .iter()
        .map(|name| {
            schema
                .field(name)
                .ok_or_else(|| PivotError::unknown_field(role, name))
        })
        .collect()
}
