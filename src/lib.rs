//! # carrier-pivot
//!
//! A pivot aggregation engine for motor-carrier safety records.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            JSON row file (normalized records)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Dataset (Schema + typed, shared rows)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [filter]
//! ┌─────────────────────────────────────────────────────────┐
//! │        RowFilter (field substrings + free search)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [controller]
//! ┌─────────────────────────────────────────────────────────┐
//! │    PivotController (spec, request ids, stale discard)    │
//! └─────────────────────────────────────────────────────────┘
//!                   │                    ▲
//!    PivotRequest   ▼ [worker]           │ PivotResponse
//! ┌─────────────────────────────────────────────────────────┐
//! │   Executor → pivot::aggregate (KeyBuilder + coerce)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [pivot]
//! ┌─────────────────────────────────────────────────────────┐
//! │     AggregationResult + AxisSets → PivotGrid (dense)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod controller;
pub mod filter;
pub mod model;
pub mod pivot;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::controller::{Delivery, PivotController, PivotState, PivotView};
    pub use crate::filter::RowFilter;
    pub use crate::model::{Dataset, Scalar, Schema};
    pub use crate::pivot::{
        aggregate, bucket_series, coerce, is_numeric_field, Aggregation, AggregationResult,
        AxisSets, DateBucket, PivotError, PivotGrid, PivotSpec,
    };
    pub use crate::worker::{Executor, InlineExecutor, WorkerClient, WorkerError};
}

// Also export at crate root for convenience
pub use model::Dataset;
pub use pivot::{aggregate, AggregationResult, PivotSpec};
