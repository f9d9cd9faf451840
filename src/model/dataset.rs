// src/model/dataset.rs
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema::{FieldRef, Row, Schema};
use super::value::Scalar;

/// Date format the ingestion layer normalizes date fields to (`2024-07-20`).
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Result type for dataset ingestion.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised while loading or validating a row set.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read dataset: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse dataset JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Dataset must be a JSON array of row objects")]
    NotAnArray,

    #[error("Row {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("Row {row} has field '{field}' which is not in the dataset schema")]
    UnknownField { row: usize, field: String },

    #[error("Row {row} field '{field}' holds a nested value; only scalars are supported")]
    NestedValue { row: usize, field: String },

    #[error("Duplicate field in schema: {0}")]
    DuplicateField(String),

    #[error("Row {row} has {found} values but the schema has {expected} fields")]
    RecordWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// An immutable, cheaply cloneable row set.
///
/// Cloning shares the underlying rows, so a dataset can be handed to a
/// background computation as a snapshot without copying.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<Schema>,
    rows: Arc<[Row]>,
    date_format: Arc<str>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            schema: Arc::new(Schema::default()),
            rows: Arc::from(Vec::new()),
            date_format: Arc::from(DEFAULT_DATE_FORMAT),
        }
    }
}

impl Dataset {
    /// Build a dataset from positional records.
    pub fn from_records<I, S>(fields: I, records: Vec<Vec<Scalar>>) -> DatasetResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Schema::new(fields)?;
        let mut rows = Vec::with_capacity(records.len());
        for (row, values) in records.into_iter().enumerate() {
            if values.len() != schema.len() {
                return Err(DatasetError::RecordWidth {
                    row,
                    expected: schema.len(),
                    found: values.len(),
                });
            }
            rows.push(Row::new(values));
        }
        Ok(Self {
            schema: Arc::new(schema),
            rows: Arc::from(rows),
            ..Default::default()
        })
    }

    /// Load a dataset from a JSON file holding an array of flat objects.
    pub fn from_path<P: AsRef<Path>>(path: P) -> DatasetResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            fields = dataset.schema().len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_json_str(json: &str) -> DatasetResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Build a dataset from a JSON array of objects.
    ///
    /// The schema is taken from the first row's keys, in order. Later rows may
    /// omit fields (they load as absent) but may not introduce new ones.
    pub fn from_json_value(value: Value) -> DatasetResult<Self> {
        let Value::Array(items) = value else {
            return Err(DatasetError::NotAnArray);
        };

        let mut objects = Vec::with_capacity(items.len());
        for (row, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(map) => objects.push(map),
                _ => return Err(DatasetError::NotAnObject { row }),
            }
        }

        let schema = match objects.first() {
            Some(first) => Schema::new(first.keys().cloned())?,
            None => Schema::default(),
        };

        let rows = objects
            .into_iter()
            .enumerate()
            .map(|(row, map)| row_from_object(&schema, row, map))
            .collect::<DatasetResult<Vec<_>>>()?;

        Ok(Self {
            schema: Arc::new(schema),
            rows: Arc::from(rows),
            ..Default::default()
        })
    }

    /// Override the date format used when bucketing date-like fields.
    pub fn with_date_format(mut self, format: impl AsRef<str>) -> Self {
        self.date_format = Arc::from(format.as_ref());
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.schema.field(name)
    }

    /// A new dataset with the rows matching `keep`, sharing this schema.
    pub fn retain<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Row) -> bool,
    {
        let rows: Vec<Row> = self.rows.iter().filter(|row| keep(row)).cloned().collect();
        Dataset {
            schema: Arc::clone(&self.schema),
            rows: Arc::from(rows),
            date_format: Arc::clone(&self.date_format),
        }
    }

    /// A new dataset with the same rows in the given order.
    ///
    /// Indices out of range are skipped.
    pub fn reorder(&self, order: &[usize]) -> Dataset {
        let rows: Vec<Row> = order
            .iter()
            .filter_map(|&i| self.rows.get(i).cloned())
            .collect();
        Dataset {
            schema: Arc::clone(&self.schema),
            rows: Arc::from(rows),
            date_format: Arc::clone(&self.date_format),
        }
    }
}

fn row_from_object(schema: &Schema, row: usize, map: Map<String, Value>) -> DatasetResult<Row> {
    let mut values = vec![Scalar::Absent; schema.len()];
    for (field, value) in map {
        let Some(position) = schema.position(&field) else {
            return Err(DatasetError::UnknownField { row, field });
        };
        values[position] = match value {
            Value::Null => Scalar::Absent,
            Value::String(s) => Scalar::Text(s),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Absent),
            Value::Bool(b) => Scalar::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => {
                return Err(DatasetError::NestedValue { row, field });
            }
        };
    }
    Ok(Row::new(values))
}
