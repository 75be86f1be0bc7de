//! Unified CSV writer.
//!
//! Projects every bank's normalized records through the shared output
//! columns into a single CSV: one header row, then one row per record in
//! (bank, then row) discovery order.

use std::fs::File;
use std::path::Path;

use crate::error::{WriteError, WriteResult};
use crate::models::BankData;
use crate::spec::OutputColumn;

/// Write the unified table to a file.
pub fn write_unified<P: AsRef<Path>>(
    path: P,
    columns: &[OutputColumn],
    data: &[BankData],
) -> WriteResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::WriterBuilder::new().from_writer(file);
    write_table(&mut writer, columns, data)?;
    writer.flush()?;
    Ok(())
}

/// Render the unified table to a string. Used by tests and debug output.
pub fn render(columns: &[OutputColumn], data: &[BankData]) -> WriteResult<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    write_table(&mut writer, columns, data)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| WriteError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_table<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    columns: &[OutputColumn],
    data: &[BankData],
) -> WriteResult<()> {
    writer.write_record(columns.iter().map(|c| c.name.as_str()))?;

    for bank_data in data {
        for record in &bank_data.records {
            let mut row = Vec::with_capacity(columns.len());
            for col in columns {
                let value = record.get(&col.field).ok_or_else(|| WriteError::MissingField {
                    bank: bank_data.bank.clone(),
                    field: col.field.clone(),
                })?;
                row.push(value.to_string());
            }
            writer.write_record(&row)?;
        }
    }

    Ok(())
}
