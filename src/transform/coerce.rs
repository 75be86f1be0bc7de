//! Type coercion: one raw cell to one typed value.
//!
//! Each field spec declares what its column holds; this is the only place
//! raw CSV text becomes a [`Value`]. No side effects, no partial results:
//! a cell either matches its declared type or the row fails.

use chrono::NaiveDate;

use crate::error::{NormalizeError, NormalizeResult};
use crate::models::Value;
use crate::spec::{FieldSpec, FieldType};

/// Coerce a raw cell to the field's declared type.
///
/// - `int` parses as a base-10 integer
/// - `float` parses as decimal floating point
/// - `date` parses with the field's strftime pattern into a calendar date
/// - `string` passes through unchanged
///
/// Numeric and date cells are trimmed before parsing; string cells are not.
pub fn coerce(field: &FieldSpec, raw: &str) -> NormalizeResult<Value> {
    match field.ty {
        FieldType::Str => Ok(Value::Str(raw.to_string())),
        FieldType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| format_error(field, raw)),
        FieldType::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format_error(field, raw)),
        FieldType::Date => {
            // Spec validation guarantees a pattern; an absent one can only
            // mean validate() was skipped, and the parse fails cleanly.
            let pattern = field.format.as_deref().unwrap_or("");
            NaiveDate::parse_from_str(raw.trim(), pattern)
                .map(Value::Date)
                .map_err(|_| format_error(field, raw))
        }
    }
}

fn format_error(field: &FieldSpec, raw: &str) -> NormalizeError {
    NormalizeError::Format {
        field: field.name.clone(),
        value: raw.to_string(),
        expected: field.ty.name(),
    }
}
