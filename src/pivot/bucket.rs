//! Date bucketing for date-like dimensions.
//!
//! Weeks follow ISO-8601: weeks start on Monday and week 1 is the week holding
//! the year's first Thursday. The label carries the ISO week-based year, so
//! `2024-12-30` falls in `2025-W01` and `2021-01-01` in `2020-W53`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::error::PivotError;
use crate::model::Scalar;

/// Label for date-like values that fail to parse.
pub const INVALID_DATE: &str = "Invalid Date";

/// Temporal granularity applied to date-like dimension values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    #[default]
    None,
    Year,
    Month,
    Week,
}

impl DateBucket {
    pub const ALL: [DateBucket; 4] = [
        DateBucket::None,
        DateBucket::Year,
        DateBucket::Month,
        DateBucket::Week,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateBucket::None => "none",
            DateBucket::Year => "year",
            DateBucket::Month => "month",
            DateBucket::Week => "week",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DateBucket::None)
    }

    /// Label for a parsed date, or `None` when no bucketing is applied.
    pub fn label(&self, date: NaiveDate) -> Option<String> {
        match self {
            DateBucket::None => None,
            DateBucket::Year => Some(format!("{:04}", date.year())),
            DateBucket::Month => Some(format!("{:04}-{:02}", date.year(), date.month())),
            DateBucket::Week => {
                let week = date.iso_week();
                Some(format!("{:04}-W{:02}", week.year(), week.week()))
            }
        }
    }

    /// Bucket a raw value.
    ///
    /// Text that parses under `format` becomes its bucket label; anything else
    /// that is present becomes [`INVALID_DATE`]. Returns `None` for missing
    /// values and when bucketing is off.
    pub fn apply<'a>(&self, raw: &'a Scalar, format: &str) -> Option<Cow<'a, str>> {
        if self.is_none() || raw.is_missing() {
            return None;
        }
        let parsed = match raw {
            Scalar::Text(s) => parse_date(s, format),
            _ => None,
        };
        match parsed.and_then(|date| self.label(date)) {
            Some(label) => Some(Cow::Owned(label)),
            None => {
                tracing::trace!(value = %raw, format, "unparseable date value");
                Some(Cow::Borrowed(INVALID_DATE))
            }
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateBucket {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(DateBucket::None),
            "year" => Ok(DateBucket::Year),
            "month" => Ok(DateBucket::Month),
            "week" => Ok(DateBucket::Week),
            _ => Err(PivotError::UnknownDateBucket(s.to_string())),
        }
    }
}

/// Parse a date under a chrono format string.
pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).ok()
}
