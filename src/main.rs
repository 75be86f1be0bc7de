//! Bankmerge CLI - merge per-bank CSV exports into one unified CSV
//!
//! # Main Command
//!
//! ```bash
//! bankmerge unify data              # data/*.csv + bank_spec.json -> unified_csv.csv
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! bankmerge parse chase.csv         # just parse a CSV to JSON rows
//! bankmerge check-spec spec.json    # load + validate a spec document
//! bankmerge example-spec            # print a worked example spec
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use bankmerge::{
    detect_delimiter, detect_encoding, decode_content, example_spec, parse_str, unify, SpecFile,
    UnifyOptions,
};

#[derive(Parser)]
#[command(name = "bankmerge")]
#[command(about = "Merge heterogeneous bank CSV exports into one unified CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize every bank CSV under a directory into one unified CSV
    Unify {
        /// Directory containing the bank CSV exports
        #[arg(default_value = "data")]
        dir: PathBuf,

        /// Bank spec document
        #[arg(short, long, default_value = "bank_spec.json")]
        spec: PathBuf,

        /// Unified output file
        #[arg(short, long, default_value = "unified_csv.csv")]
        output: PathBuf,
    },

    /// Parse a CSV file and output its raw rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a spec document and run its cross-reference checks
    CheckSpec {
        /// Spec document to check
        file: PathBuf,
    },

    /// Print a worked example spec document
    ExampleSpec,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Unify { dir, spec, output } => cmd_unify(&dir, spec, output),
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),
        Commands::CheckSpec { file } => cmd_check_spec(&file),
        Commands::ExampleSpec => cmd_example_spec(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_unify(
    dir: &Path,
    spec: PathBuf,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Merging bank exports from: {}", dir.display());

    let options = UnifyOptions {
        spec_path: spec,
        output_path: output,
    };
    let summary = unify(dir, &options)?;

    for file in &summary.files {
        eprintln!(
            "   {} (bank '{}'): {} records",
            file.file.display(),
            file.bank,
            file.records
        );
    }
    eprintln!(
        "✅ Wrote {} records to: {}",
        summary.records,
        summary.output_path.display()
    );
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    let used_delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    eprintln!("   Encoding: {}", encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        match used_delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        },
        if delimiter.is_none() {
            " (auto-detected)"
        } else {
            ""
        }
    );

    let rows = parse_str(&content, used_delimiter)?;
    eprintln!("✅ Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_check_spec(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking spec: {}", file.display());

    let spec = SpecFile::from_file(file)?;
    spec.validate()?;

    let mut banks: Vec<&String> = spec.banks.keys().collect();
    banks.sort();
    for bank in banks {
        let entry = &spec.banks[bank];
        eprintln!(
            "   {}: {} fields, {} rules, {} output columns",
            bank,
            entry.fields.len(),
            entry.transform.len(),
            entry.to_csv.len()
        );
    }
    eprintln!("✅ Spec is valid ({} banks)", spec.banks.len());
    Ok(())
}

fn cmd_example_spec() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", example_spec().to_json()?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
