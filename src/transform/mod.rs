//! Spec-driven record transformation.
//!
//! The core of the pipeline:
//! - Coerce: raw cell text to typed values
//! - Rules: ordered arithmetic transforms over a decoded record
//! - Normalize: one raw row to one normalized record
//! - Pipeline: file discovery, per-bank reading, unified output

pub mod coerce;
pub mod normalize;
pub mod pipeline;
pub mod rules;

pub use coerce::coerce;
pub use normalize::normalize_row;
pub use pipeline::{read_bank_file, unify, FileSummary, UnifyOptions, UnifySummary};
pub use rules::apply as apply_rules;
