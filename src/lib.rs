//! # Bankmerge - unified bank-transaction CSV normalization
//!
//! Bankmerge ingests CSV exports from multiple banks, each with its own
//! column layout, and normalizes them into one unified CSV using a
//! declarative per-bank spec document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Bank CSVs  │────▶│   Parser    │────▶│  Normalize  │────▶│ Unified CSV │
//! │ (per-bank)  │     │ (auto-enc)  │     │(coerce+rule)│     │ (projected) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                            ▲
//!                     bank_spec.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bankmerge::{unify, UnifyOptions};
//! use std::path::Path;
//!
//! fn main() {
//!     let summary = unify(Path::new("data"), &UnifyOptions::default()).unwrap();
//!     println!("Wrote {} records", summary.records);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - per-stage error types
//! - [`models`] - domain models (Value, Record, BankData)
//! - [`spec`] - declarative bank spec (fields, rules, projection)
//! - [`parser`] - raw CSV reading with encoding/delimiter detection
//! - [`transform`] - coercion, rule engine, normalizer, pipeline
//! - [`writer`] - unified CSV output

// Core modules
pub mod error;
pub mod models;

// Spec document
pub mod spec;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, NormalizeError, PipelineError, RuleError, SpecError, WriteError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{BankData, Record, Value, BANK_FIELD};

// =============================================================================
// Re-exports - Spec
// =============================================================================

pub use spec::{
    example_spec, BankSpec, FieldSpec, FieldType, Op, Operand, OutputColumn, Rule, SpecFile,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_file_auto,
    parse_str, ParseResult, RawRow,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    apply_rules, coerce, normalize_row, read_bank_file, unify, FileSummary, UnifyOptions,
    UnifySummary,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use writer::write_unified;
