// src/model/schema.rs
use std::collections::HashMap;

use super::dataset::{DatasetError, DatasetResult};
use super::value::Scalar;

static ABSENT: Scalar = Scalar::Absent;

/// Ordered field list shared by every row of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new<I, S>(fields: I) -> DatasetResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Schema::default();
        for field in fields {
            let field = field.into();
            if schema.index.contains_key(&field) {
                return Err(DatasetError::DuplicateField(field));
            }
            schema.index.insert(field.clone(), schema.fields.len());
            schema.fields.push(field);
        }
        Ok(schema)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolve a field name to a typed reference.
    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.position(name).map(|index| FieldRef {
            index,
            date_like: is_date_like(name),
        })
    }
}

/// A field resolved against a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef {
    index: usize,
    date_like: bool,
}

impl FieldRef {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether date bucketing applies to this field.
    pub fn is_date_like(&self) -> bool {
        self.date_like
    }
}

/// A field is date-like when its name contains "DT" or "date", ignoring case.
pub fn is_date_like(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("dt") || lower.contains("date")
}

/// One record, stored positionally against its dataset's schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Box<[Scalar]>,
}

impl Row {
    pub fn new(values: Vec<Scalar>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }

    pub fn get(&self, field: FieldRef) -> &Scalar {
        self.values.get(field.index).unwrap_or(&ABSENT)
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }
}
