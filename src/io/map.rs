//! Genetic map parsing (`.map[.gz]`).
use std::io::BufRead;

use anyhow::{bail, Context, Result};

/// Read a genetic map: a whitespace-separated table whose third column is
/// the genetic position and whose fourth is the physical position. Returns
/// the two position vectors in site order.
pub fn read_map(reader: impl BufRead) -> Result<(Vec<f64>, Vec<u64>)> {
    let mut genetic_positions = Vec::new();
    let mut physical_positions = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.context("Could not read genetic map line")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 {
            bail!(
                "Expected at least 4 columns on line {}, found {}",
                line_idx + 1,
                fields.len()
            );
        }
        let genetic: f64 = fields[2].parse().with_context(|| {
            format!(
                "Could not parse genetic position '{}' on line {}",
                fields[2],
                line_idx + 1
            )
        })?;
        let physical: u64 = fields[3].parse().with_context(|| {
            format!(
                "Could not parse physical position '{}' on line {}",
                fields[3],
                line_idx + 1
            )
        })?;
        genetic_positions.push(genetic);
        physical_positions.push(physical);
    }
    if genetic_positions.is_empty() {
        bail!("Genetic map contains no sites");
    }

    Ok((genetic_positions, physical_positions))
}
