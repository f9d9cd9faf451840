//! Numeric coercion of raw cell values.
//!
//! Coercion is lenient: anything that does not read as a finite decimal
//! contributes zero instead of failing the fold.

use super::error::{FieldRole, PivotError, PivotResult};
use crate::model::{Dataset, Scalar};

/// Numeric contribution of a raw value.
pub fn coerce(raw: &Scalar) -> f64 {
    match raw {
        Scalar::Number(n) if n.is_finite() => *n,
        Scalar::Text(s) => parse_numeric_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parse the longest leading decimal literal of `s`.
///
/// Leading whitespace is skipped, then an optional sign, digits with an
/// optional fraction, and an optional exponent. Trailing text is ignored
/// (`"12 units"` reads as 12). Returns `None` when there is no digit or the
/// value is not finite.
pub fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // A bare "." only counts when digits precede it.
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Whether a raw value can take part in a sum without being discarded.
pub fn is_numeric_value(raw: &Scalar) -> bool {
    match raw {
        Scalar::Absent => true,
        Scalar::Number(n) => n.is_finite(),
        Scalar::Text(_) if raw.is_placeholder() => true,
        Scalar::Text(s) => parse_numeric_prefix(s).is_some(),
    }
}

/// Whether `field` is eligible for `sum` over the whole dataset.
///
/// Every row must hold a number, a numeric string, the placeholder, or
/// nothing. Pass the unfiltered dataset; eligibility describes the column,
/// not the current view. Any field is eligible over a dataset with no rows.
pub fn is_numeric_field(dataset: &Dataset, field: &str) -> PivotResult<bool> {
    if dataset.is_empty() {
        return Ok(true);
    }
    let field_ref = dataset
        .field(field)
        .ok_or_else(|| PivotError::unknown_field(FieldRole::Value, field))?;
    Ok(dataset
        .rows()
        .iter()
        .all(|row| is_numeric_value(row.get(field_ref))))
}
