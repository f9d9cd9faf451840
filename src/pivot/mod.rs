//! Pivot aggregation engine.
//!
//! Rows are grouped by a composite row key and column key built from the
//! dimension fields of a [`PivotSpec`], and each cell folds the rows that
//! share both keys:
//!
//! ```text
//! Dataset ──► KeyBuilder (row key, column key)
//!        └──► coerce(value field)
//!                 │
//!                 ▼
//!        AggregationResult  { row key: { column key: f64 } }
//!                 │  + AxisSets (every key seen, first-seen order)
//!                 ▼
//!            PivotGrid (zero-filled, with totals)
//! ```
//!
//! Everything here is synchronous and pure; the worker module moves it off
//! the caller's path.

pub mod aggregate;
pub mod axes;
pub mod bucket;
pub mod coerce;
pub mod error;
pub mod grid;
pub mod key;
pub mod series;
pub mod spec;

pub use aggregate::{aggregate, aggregate_resolved, AggregationResult};
pub use axes::AxisSets;
pub use bucket::{parse_date, DateBucket, INVALID_DATE};
pub use coerce::{coerce, is_numeric_field, is_numeric_value, parse_numeric_prefix};
pub use error::{FieldRole, PivotError, PivotResult};
pub use grid::{GridRow, PivotGrid, ALL_COLUMNS_LABEL};
pub use key::{build_key, KeyBuilder, KEY_SEPARATOR};
pub use series::{bucket_series, SeriesPoint};
pub use spec::{Aggregation, PivotSpec, ResolvedSpec};
