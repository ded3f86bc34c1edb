//! CSV output formatter for per-root totals.
//!
//! Exports one row per root so results can be loaded into other tools.

use crate::data::RootTotal;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io;
use std::path::Path;

/// One CSV record.
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    path: String,
    blocks: i64,
    bytes: u64,
}

impl From<&RootTotal> for CsvRow {
    fn from(total: &RootTotal) -> Self {
        Self {
            path: total.path.display().to_string(),
            blocks: total.blocks,
            bytes: total.bytes(),
        }
    }
}

/// Serializes `totals` as CSV into `out`.
pub fn write_to<W: io::Write>(out: W, totals: &[RootTotal]) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for total in totals {
        writer.serialize(CsvRow::from(total))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders totals as CSV to `output`, or to stdout when `output` is `None`.
pub fn render(totals: &[RootTotal], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            write_to(file, totals)
        }
        None => write_to(io::stdout(), totals),
    }
}
