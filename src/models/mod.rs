//! Domain models for the bankmerge pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`Value`] - one typed cell (string, integer, float, or calendar date)
//! - [`Record`] - one normalized transaction row, tagged with its source bank
//! - [`BankData`] - one bank's full record sequence, in row order

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Name of the reserved record entry holding the source bank.
///
/// Stamped on every record by the normalizer; bank specs may project it
/// into the unified output but may not declare a field with this name.
pub const BANK_FIELD: &str = "bank_name";

// =============================================================================
// Typed Values
// =============================================================================

/// One typed cell of a normalized record.
///
/// Raw CSV cells are strings; the coercion step turns each into the variant
/// its field spec declares. Transform rules operate on the numeric variants
/// and the writer serializes all of them back to text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Uninterpreted text.
    Str(String),
    /// Base-10 integer.
    Int(i64),
    /// Decimal floating point.
    Float(f64),
    /// Calendar date, no time-of-day.
    Date(NaiveDate),
}

impl Value {
    /// Human-readable name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
        }
    }

    /// Get the integer if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a float, promoting `Int` the way mixed arithmetic does.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the text if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the date if this is a `Date`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether arithmetic rules may operate on this value.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

/// CSV serialization of a value.
///
/// Integral floats keep a trailing `.0` so an amount of `95.0` does not
/// flatten to `95`; dates serialize as ISO `YYYY-MM-DD`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

// =============================================================================
// Normalized Records
// =============================================================================

/// One normalized transaction row.
///
/// Maps field names to typed values and always carries the reserved
/// [`BANK_FIELD`] entry naming the source bank. Created by the normalizer,
/// mutated only by the transform rule engine, then read-only until the
/// writer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record stamped with its source bank.
    pub fn new(bank: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(BANK_FIELD.to_string(), Value::Str(bank.to_string()));
        Self { values }
    }

    /// The source bank this record was read from.
    pub fn bank_name(&self) -> &str {
        match self.values.get(BANK_FIELD) {
            Some(Value::Str(s)) => s,
            _ => "",
        }
    }

    /// Look up a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    /// Whether the record contains a field.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of fields, including the bank stamp.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True only for a record that somehow lost even its bank stamp.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Per-Bank Datasets
// =============================================================================

/// One bank's fully normalized dataset, in input row order.
#[derive(Debug, Clone, Serialize)]
pub struct BankData {
    /// Bank name derived from the input filename.
    pub bank: String,
    /// Normalized records, one per data row.
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_display_keeps_decimal() {
        assert_eq!(Value::Float(95.0).to_string(), "95.0");
        assert_eq!(Value::Float(-3.0).to_string(), "-3.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(33.25).to_string(), "33.25");
    }

    #[test]
    fn test_int_and_string_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::from("deposit").to_string(), "deposit");
    }

    #[test]
    fn test_date_display_iso() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2020-01-02");
    }

    #[test]
    fn test_as_float_promotes_int() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_float(), Some(3.5));
        assert_eq!(Value::from("3").as_float(), None);
    }

    #[test]
    fn test_record_stamps_bank() {
        let rec = Record::new("chase");
        assert_eq!(rec.bank_name(), "chase");
        assert_eq!(rec.get(BANK_FIELD), Some(&Value::Str("chase".into())));
    }

    #[test]
    fn test_record_insert_and_get() {
        let mut rec = Record::new("chase");
        rec.insert("amount", Value::Float(100.0));
        assert_eq!(rec.get("amount"), Some(&Value::Float(100.0)));
        assert!(rec.contains("amount"));
        assert!(!rec.contains("balance"));
        assert_eq!(rec.len(), 2);
    }
}
