//! JSON result output.
use std::io::Write;

use anyhow::{Context, Result};

use crate::search::QueryCousins;

/// Write the full windowed result set as one JSON array.
pub fn write_cousins<W: Write>(mut writer: W, results: &[QueryCousins]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, results)
        .context("Could not serialize results to JSON")?;
    writeln!(writer)?;

    Ok(())
}
