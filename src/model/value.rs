// src/model/value.rs
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Marker the ingestion layer writes for "no value".
pub const PLACEHOLDER: &str = "-";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    Text(String),
    Number(f64),
    #[default]
    Absent,
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Scalar::Absent)
    }

    /// True for the `"-"` placeholder string.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Scalar::Text(s) if s == PLACEHOLDER)
    }

    /// Absent or placeholder.
    pub fn is_missing(&self) -> bool {
        self.is_absent() || self.is_placeholder()
    }

    /// Text form of a present value; `None` when absent.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Scalar::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Scalar::Number(n) => Some(Cow::Owned(format_number(*n))),
            Scalar::Absent => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Absent => f.write_str(PLACEHOLDER),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Number(n) => serializer.serialize_f64(*n),
            Scalar::Absent => serializer.serialize_none(),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Absent)
    }
}

/// Shortest decimal form of a number (`10`, `12.5`, `-0.25`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid rendering negative zero as "-0".
        return "0".to_string();
    }
    format!("{}", n)
}
