//! Typed row storage.
//!
//! Rows arrive from the ingestion layer as flat field-name-to-scalar records.
//! They are validated once against a [`Schema`] derived from the first row and
//! stored positionally, so the aggregation path reads values through resolved
//! [`FieldRef`]s instead of string lookups.

pub mod dataset;
pub mod schema;
pub mod value;

pub use dataset::{Dataset, DatasetError, DatasetResult, DEFAULT_DATE_FORMAT};
pub use schema::{is_date_like, FieldRef, Row, Schema};
pub use value::{format_number, Scalar, PLACEHOLDER};
