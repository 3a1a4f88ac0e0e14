//! Tabular export of a cut plan.
//!
//! Rows are `portion, start_slice, end_slice, length_mm, weight_g`. Portions are
//! numbered from 1 in slice order; a discarded waste remainder is appended as
//! a row labelled `waste`.

use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use csv::Writer as CsvWriter;

use crate::segment::{Portion, WasteRecord};

const HEADER: [&str; 5] = ["portion", "start_slice", "end_slice", "length_mm", "weight_g"];

/// Writes the portion table to any writer.
pub fn write_portion_table<W: Write>(
    writer: W,
    portions: &[Portion],
    waste: &WasteRecord,
) -> Result<()> {
    let mut wtr = CsvWriter::from_writer(writer);
    wtr.write_record(HEADER)?;

    for (idx, portion) in portions.iter().enumerate() {
        wtr.write_record([
            (idx + 1).to_string(),
            portion.start_index.to_string(),
            portion.end_index.to_string(),
            format!("{:.3}", portion.length_mm),
            format!("{:.3}", portion.weight_g),
        ])?;
    }

    if waste.is_discarded() {
        wtr.write_record([
            "waste".to_string(),
            opt_index(waste.start_index),
            opt_index(waste.end_index),
            format!("{:.3}", waste.length_mm),
            format!("{:.3}", waste.weight_g),
        ])?;
    }

    wtr.flush().context("failed to flush portion table")?;
    Ok(())
}

/// Writes the portion table to a CSV file at `path`.
pub fn export_portion_table<P: AsRef<Path>>(
    path: P,
    portions: &[Portion],
    waste: &WasteRecord,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create portion table {}", path.display()))?;
    write_portion_table(file, portions, waste)
        .with_context(|| format!("failed to write portion table to {}", path.display()))
}

fn opt_index(index: Option<usize>) -> String {
    index.map(|i| i.to_string()).unwrap_or_default()
}
