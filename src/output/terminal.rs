//! Terminal output formatter for per-root totals.

use crate::data::RootTotal;
use anyhow::Result;
use humansize::{DECIMAL, format_size};
use std::io::{self, Write};

/// Formats one result line.
///
/// Raw mode prints the 512-byte block count; human-readable mode prints the
/// allocated size in bytes with SI units.
pub fn format_line(total: &RootTotal, human_readable: bool) -> String {
    let size = if human_readable {
        format_size(total.bytes(), DECIMAL)
    } else {
        total.blocks.to_string()
    };
    format!("{}     {}", size, total.path.display())
}

/// Writes every total to `out`, one line each.
pub fn write_to<W: Write>(out: &mut W, totals: &[RootTotal], human_readable: bool) -> Result<()> {
    for total in totals {
        writeln!(out, "{}", format_line(total, human_readable))?;
    }
    out.flush()?;
    Ok(())
}

/// Renders totals to stdout.
pub fn render(totals: &[RootTotal], human_readable: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_to(&mut lock, totals, human_readable)
}
