//! Unit normalization
//!
//! Routers report most radio values as text with a unit suffix and, for
//! values at the edge of the measurable range, a `>=` prefix. [`normalize`]
//! turns such a string into a plain `f64`.

use crate::error::ParseError;
use crate::snapshot::FieldValue;

/// Literal the router uses for unavailable values
pub const NONE_LITERAL: &str = "None";

/// Comparison prefix stripped before parsing
pub const GE_PREFIX: &str = ">=";

/// Scale applied for units that are not base units
const UNIT_SCALE: &[(&str, f64)] = &[("kHz", 1_000.0), ("MHz", 1_000_000.0)];

/// Scale factor for a unit; units without an entry scale by 1
pub fn unit_scale(unit: &str) -> f64 {
    UNIT_SCALE
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, scale)| *scale)
        .unwrap_or(1.0)
}

/// Parse a raw device value into a number.
///
/// Absent values and the literal `"None"` yield `0`. A unit that does not
/// occur in `raw` is ignored and parsing proceeds on the full string.
///
/// # Errors
///
/// Returns [`ParseError::NotNumeric`] if the remainder is not a float.
pub fn normalize(raw: Option<&str>, unit: &str, multiplier: f64) -> Result<f64, ParseError> {
    let raw = match raw {
        None => return Ok(0.0),
        Some(NONE_LITERAL) => return Ok(0.0),
        Some(raw) => raw,
    };

    let value = raw.strip_prefix(GE_PREFIX).unwrap_or(raw);
    let value = if unit.is_empty() {
        value.to_string()
    } else {
        value.replace(unit, "")
    };

    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| ParseError::NotNumeric {
            raw: raw.to_string(),
        })?;

    Ok(parsed * multiplier * unit_scale(unit))
}

/// [`normalize`] applied to a snapshot field
pub fn normalize_field(value: &FieldValue, unit: &str, multiplier: f64) -> Result<f64, ParseError> {
    match value {
        FieldValue::Null => Ok(0.0),
        FieldValue::Number(n) => Ok(n * multiplier * unit_scale(unit)),
        FieldValue::Text(s) => normalize(Some(s), unit, multiplier),
    }
}
