//! Tab-separated result output.
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{index::HapIndex, search::QueryCousins};

/// One output row: a single cousin of one query haplotype in one window.
#[derive(Debug, Serialize)]
struct CousinRecord<'a> {
    hap_id: usize,
    hap_name: &'a str,
    window_start: usize,
    window_end: usize,
    cousin_id: usize,
    cousin_name: &'a str,
    score: usize,
}

/// Write one row per (query haplotype, window, cousin), resolving sample
/// names against the index. Windows without cousins produce no rows.
pub fn write_cousins<W: Write>(
    writer: W,
    index: &HapIndex,
    results: &[QueryCousins],
) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    for query in results {
        for window in &query.windows {
            for cousin in &window.cousins {
                tsv.serialize(CousinRecord {
                    hap_id: query.hap_id,
                    hap_name: index.sample_name(query.hap_id)?,
                    window_start: window.start_site,
                    window_end: window.end_site,
                    cousin_id: cousin.hap_id,
                    cousin_name: index.sample_name(cousin.hap_id)?,
                    score: cousin.score,
                })?;
            }
        }
    }
    tsv.flush().context("Could not flush TSV output")?;

    Ok(())
}
