//! High-level pipeline API: heterogeneous bank CSVs to one unified CSV.
//!
//! This module combines all steps: spec loading, recursive `.csv`
//! discovery, per-file reading and normalization, and the single unified
//! write at the end.
//!
//! # Example
//!
//! ```rust,ignore
//! use bankmerge::{unify, UnifyOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = unify(Path::new("data"), &UnifyOptions::default())?;
//!     println!("Wrote {} records", summary.records);
//!     Ok(())
//! }
//! ```
//!
//! The run is fail-fast: the first bad row aborts everything, with the
//! failing file and row in the error, and the output file is only created
//! after every input has normalized cleanly. There is no per-row
//! skip-and-continue and no partial output.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::models::BankData;
use crate::parser::parse_file_auto;
use crate::spec::SpecFile;
use crate::transform::normalize::normalize_row;
use crate::writer::write_unified;

/// Options for a unify run.
#[derive(Debug, Clone)]
pub struct UnifyOptions {
    /// Path to the bank spec document.
    pub spec_path: PathBuf,

    /// Path of the unified output CSV.
    pub output_path: PathBuf,
}

impl Default for UnifyOptions {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from("bank_spec.json"),
            output_path: PathBuf::from("unified_csv.csv"),
        }
    }
}

/// What one completed run produced.
#[derive(Debug, Clone)]
pub struct UnifySummary {
    /// Per-file results in discovery order.
    pub files: Vec<FileSummary>,

    /// Total records written.
    pub records: usize,

    /// Where the unified CSV landed.
    pub output_path: PathBuf,
}

/// One input file's contribution.
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// Input file path.
    pub file: PathBuf,

    /// Bank name derived from the filename.
    pub bank: String,

    /// Records normalized from this file.
    pub records: usize,
}

/// Run the whole pipeline over a source directory.
///
/// Loads and validates the spec, discovers every `.csv` under `dir`
/// recursively, reads each file into normalized records, and writes the
/// unified output.
pub fn unify(dir: &Path, options: &UnifyOptions) -> PipelineResult<UnifySummary> {
    let spec = SpecFile::from_file(&options.spec_path)?;
    spec.validate()?;

    let files = discover_csv_files(dir)?;

    let mut data = Vec::with_capacity(files.len());
    let mut summaries = Vec::with_capacity(files.len());
    for file in files {
        let bank_data = read_bank_file(&file, &spec)?;
        summaries.push(FileSummary {
            file,
            bank: bank_data.bank.clone(),
            records: bank_data.records.len(),
        });
        data.push(bank_data);
    }

    let columns = spec.output_columns()?;
    write_unified(&options.output_path, columns, &data)?;

    Ok(UnifySummary {
        records: summaries.iter().map(|f| f.records).sum(),
        files: summaries,
        output_path: options.output_path.clone(),
    })
}

/// Read one bank's CSV file into normalized records.
///
/// The bank name is the filename portion before the first `.`
/// (`chase.v2.csv` reads as bank `chase`); it must have a spec entry.
/// Row failures come back wrapped with the file and row that caused them.
pub fn read_bank_file(path: &Path, spec: &SpecFile) -> PipelineResult<BankData> {
    let file = path.display().to_string();
    let bank = bank_name_of(path);

    let bank_spec = spec.get(&bank).ok_or_else(|| PipelineError::UnknownBank {
        file: file.clone(),
        bank: bank.clone(),
    })?;

    let parsed = parse_file_auto(path).map_err(|source| PipelineError::Csv {
        file: file.clone(),
        source,
    })?;

    let mut records = Vec::with_capacity(parsed.rows.len());
    for (i, row) in parsed.rows.iter().enumerate() {
        // +1 for 1-indexing, +1 for the header line.
        let record =
            normalize_row(&bank, bank_spec, row).map_err(|source| PipelineError::Row {
                file: file.clone(),
                row: i + 2,
                source,
            })?;
        records.push(record);
    }

    Ok(BankData { bank, records })
}

/// Bank name derived from a file path: the portion before the first `.`.
pub fn bank_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Collect every `.csv` file under `dir`, recursively.
///
/// Entries are sorted per directory so discovery order (and therefore
/// output row order) is stable across runs.
pub fn discover_csv_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files).map_err(|source| PipelineError::Csv {
        file: dir.display().to_string(),
        source: source.into(),
    })?;
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    Ok(())
}
