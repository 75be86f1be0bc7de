//! Error types for the bankmerge pipeline.
//!
//! This module defines one error enum per pipeline stage:
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`SpecError`] - bank spec loading and validation errors
//! - [`RuleError`] - transform rule execution errors
//! - [`NormalizeError`] - row normalization errors
//! - [`WriteError`] - unified output errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Row-level failures
//! are the exception: they only enter [`PipelineError`] through
//! [`PipelineError::Row`], which carries the failing file and row.

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading a raw CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the file.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Could not decode the file contents.
    #[error("failed to decode file contents: {0}")]
    Encoding(String),

    /// File has no content at all.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Header line contains no column names.
    #[error("no headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Bank Spec Errors
// =============================================================================

/// Errors while loading or validating the bank spec document.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Failed to read the spec file.
    #[error("failed to read spec file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON, or an unrecognized field type / rule operation.
    #[error("invalid spec document: {0}")]
    Json(#[from] serde_json::Error),

    /// A date field without a parse pattern.
    #[error("bank '{bank}': date field '{field}' has no format pattern")]
    MissingDateFormat { bank: String, field: String },

    /// A transform rule or output column names a field the bank never declares.
    #[error("bank '{bank}': {context} references undeclared field '{field}'")]
    UnknownFieldRef {
        bank: String,
        context: String,
        field: String,
    },

    /// Rule operand has the wrong shape for its operation.
    #[error("bank '{bank}': rule on field '{field}' expects {expected} operand")]
    BadOperand {
        bank: String,
        field: String,
        expected: &'static str,
    },

    /// Banks disagree on the unified output columns.
    #[error("bank '{bank}': output columns differ from bank '{first}'")]
    ProjectionMismatch { bank: String, first: String },

    /// A bank declares a field with the reserved name.
    #[error("bank '{bank}': field name '{field}' is reserved")]
    ReservedField { bank: String, field: String },

    /// Spec document with no bank entries at all.
    #[error("spec document declares no banks")]
    EmptyDocument,
}

// =============================================================================
// Transform Rule Errors
// =============================================================================

/// Errors while applying transform rules to a record.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Invalid numeric operation, e.g. divide by zero.
    #[error("arithmetic error on field '{field}': {message}")]
    Arithmetic { field: String, message: String },

    /// Rule applied to a value its operation cannot combine with.
    #[error("type mismatch: cannot {op} {found} value in field '{field}'")]
    TypeMismatch {
        field: String,
        op: &'static str,
        found: &'static str,
    },

    /// Rule references a field absent from the record.
    #[error("missing field '{0}' in record")]
    MissingField(String),
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while normalizing one raw row.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Raw value does not match the field's declared type or pattern.
    #[error("field '{field}': value '{value}' is not a valid {expected}")]
    Format {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Declared field absent from the row.
    #[error("missing field '{0}' in row")]
    MissingField(String),

    /// Transform rule failed on the decoded record.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

// =============================================================================
// Unified Output Errors
// =============================================================================

/// Errors while writing the unified CSV.
#[derive(Debug, Error)]
pub enum WriteError {
    /// A declared output field is absent from a record.
    #[error("bank '{bank}': missing field '{field}' in record")]
    MissingField { bank: String, field: String },

    /// CSV serialization failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to create or flush the output file.
    #[error("failed to write output file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::unify`].
/// It wraps all lower-level errors and attaches file/row context where a
/// failure originates inside an input file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV reading error.
    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: CsvError,
    },

    /// Spec loading or validation error.
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    /// Input file whose derived bank name has no spec entry.
    #[error("{file}: unknown bank '{bank}' not present in spec")]
    UnknownBank { file: String, bank: String },

    /// Row-level normalization failure, with its origin.
    #[error("{file}, row {row}: {source}")]
    Row {
        file: String,
        row: usize,
        #[source]
        source: NormalizeError,
    },

    /// Unified output error.
    #[error("output error: {0}")]
    Write(#[from] WriteError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Result type for rule application.
pub type RuleResult<T> = Result<T, RuleError>;

/// Result type for row normalization.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for unified output.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_enters_normalize_error() {
        let rule_err = RuleError::Arithmetic {
            field: "amount".into(),
            message: "division by zero".into(),
        };
        let norm_err: NormalizeError = rule_err.into();
        assert!(norm_err.to_string().contains("division by zero"));
    }

    #[test]
    fn test_row_error_carries_context() {
        let err = PipelineError::Row {
            file: "data/chase.csv".into(),
            row: 3,
            source: NormalizeError::MissingField("amount".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/chase.csv"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("amount"));
    }

    #[test]
    fn test_format_error_names_field_and_value() {
        let err = NormalizeError::Format {
            field: "date".into(),
            value: "13/32/2020".into(),
            expected: "date",
        };
        let msg = err.to_string();
        assert!(msg.contains("date"));
        assert!(msg.contains("13/32/2020"));
    }

    #[test]
    fn test_unknown_bank_message() {
        let err = PipelineError::UnknownBank {
            file: "data/unknown.csv".into(),
            bank: "unknown".into(),
        };
        assert!(err.to_string().contains("unknown bank"));
    }
}
