//! Sample manifest parsing (`.sample`/`.samples`).
use std::io::BufRead;

use anyhow::{bail, Context, Result};

/// Read the haplotype names from a sample manifest: a whitespace-separated
/// table in which every data row contributes its first two columns as two
/// haplotype names. The optional two-line header is recognized by its
/// first three columns being `ID_1 ID_2 missing` or `0 0 0` and skipped.
pub fn read_samples(reader: impl BufRead) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.context("Could not read sample manifest line")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 3 {
            bail!(
                "Expected at least 3 columns on line {}, found {}",
                line_idx + 1,
                fields.len()
            );
        }
        if fields[..3] == ["ID_1", "ID_2", "missing"] || fields[..3] == ["0", "0", "0"] {
            continue;
        }
        names.push(fields[0].to_string());
        names.push(fields[1].to_string());
    }

    Ok(names)
}
