//! One-dimensional bucketed counts over a single field.

use serde::Serialize;
use std::collections::HashMap;

use super::bucket::{parse_date, DateBucket};
use super::error::{FieldRole, PivotError, PivotResult};
use crate::model::{format_number, Dataset, Scalar};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub count: u64,
}

/// Count rows per bucket of `field`, in order of first appearance.
///
/// Missing values are skipped. When `bucket` is set the field is read as a
/// date under the dataset's format whatever its name, and values that do not
/// parse are skipped rather than counted as invalid.
pub fn bucket_series(dataset: &Dataset, field: &str, bucket: DateBucket) -> PivotResult<Vec<SeriesPoint>> {
    if dataset.is_empty() {
        return Ok(Vec::new());
    }
    let field_ref = dataset
        .field(field)
        .ok_or_else(|| PivotError::unknown_field(FieldRole::Series, field))?;

    let mut points: Vec<SeriesPoint> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in dataset.rows() {
        let Some(label) = series_label(row.get(field_ref), bucket, dataset.date_format()) else {
            continue;
        };
        match index.get(&label) {
            Some(&i) => points[i].count += 1,
            None => {
                index.insert(label.clone(), points.len());
                points.push(SeriesPoint { label, count: 1 });
            }
        }
    }
    Ok(points)
}

fn series_label(raw: &Scalar, bucket: DateBucket, format: &str) -> Option<String> {
    if raw.is_missing() {
        return None;
    }
    if bucket.is_none() {
        return Some(match raw {
            Scalar::Number(n) => format_number(*n),
            _ => raw.to_string(),
        });
    }
    match raw {
        Scalar::Text(s) => parse_date(s, format).and_then(|date| bucket.label(date)),
        _ => None,
    }
}
