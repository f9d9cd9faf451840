//! Composite grouping keys.
//!
//! A key is the per-dimension values of a row, in dimension order, joined
//! with [`KEY_SEPARATOR`]. Absent values render as [`PLACEHOLDER`], and
//! date-like values are replaced by their bucket label when bucketing is on.

use super::bucket::DateBucket;
use super::error::{FieldRole, PivotResult};
use super::spec::resolve_fields;
use crate::model::{format_number, Dataset, FieldRef, Row, Scalar, PLACEHOLDER};

pub const KEY_SEPARATOR: &str = " / ";

/// Builds composite keys for one ordered dimension list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    fields: Vec<FieldRef>,
    bucket: DateBucket,
    date_format: String,
}

impl KeyBuilder {
    pub fn new(fields: Vec<FieldRef>, bucket: DateBucket, date_format: impl Into<String>) -> Self {
        Self {
            fields,
            bucket,
            date_format: date_format.into(),
        }
    }

    /// Resolve `dimensions` against the dataset's schema.
    pub fn for_dimensions(
        dataset: &Dataset,
        dimensions: &[String],
        role: FieldRole,
        bucket: DateBucket,
    ) -> PivotResult<Self> {
        let fields = resolve_fields(dataset.schema(), dimensions, role)?;
        Ok(Self::new(fields, bucket, dataset.date_format()))
    }

    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    pub fn build(&self, row: &Row) -> String {
        build_key(row, &self.fields, self.bucket, &self.date_format)
    }
}

/// Composite key of `row` over `dimensions`.
pub fn build_key(row: &Row, dimensions: &[FieldRef], bucket: DateBucket, date_format: &str) -> String {
    let mut key = String::new();
    for (i, field) in dimensions.iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_SEPARATOR);
        }
        push_part(&mut key, row.get(*field), *field, bucket, date_format);
    }
    key
}

fn push_part(key: &mut String, value: &Scalar, field: FieldRef, bucket: DateBucket, date_format: &str) {
    if field.is_date_like() {
        if let Some(label) = bucket.apply(value, date_format) {
            key.push_str(&label);
            return;
        }
    }
    match value {
        Scalar::Text(s) => key.push_str(s),
        Scalar::Number(n) => key.push_str(&format_number(*n)),
        Scalar::Absent => key.push_str(PLACEHOLDER),
    }
}
