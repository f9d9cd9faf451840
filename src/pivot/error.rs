//! Pivot configuration errors.

use std::fmt;
use thiserror::Error;

/// Result type for pivot operations.
pub type PivotResult<T> = Result<T, PivotError>;

/// Where a field name was used in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Row,
    Column,
    Value,
    Filter,
    Series,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldRole::Row => "row dimension",
            FieldRole::Column => "column dimension",
            FieldRole::Value => "value",
            FieldRole::Filter => "filter",
            FieldRole::Series => "series",
        };
        f.write_str(s)
    }
}

/// Structurally invalid pivot requests.
///
/// Per-row problems (bad dates, non-numeric values) never surface here; they
/// are absorbed into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PivotError {
    /// Aggregation name other than `sum` or `count`.
    #[error("unknown aggregation '{0}' (expected one of: sum, count)")]
    UnknownAggregation(String),

    /// Date bucket name other than `none`, `year`, `month` or `week`.
    #[error("unknown date bucket '{0}' (expected one of: none, year, month, week)")]
    UnknownDateBucket(String),

    /// A field name that the dataset schema does not define.
    #[error("{role} field '{field}' is not in the dataset schema")]
    UnknownField { role: FieldRole, field: String },

    /// A pivot must group rows by at least one field.
    #[error("a pivot needs at least one row dimension")]
    NoRowDimensions,
}

impl PivotError {
    pub fn unknown_field(role: FieldRole, field: impl Into<String>) -> Self {
        Self::UnknownField {
            role,
            field: field.into(),
        }
    }
}
