//! # Panel input and result output
//!
//! Reading a haplotype panel takes three files sharing a root path: a
//! sample manifest (`<root>.sample[s]`), a genetic map (`<root>.map[.gz]`
//! or an explicit path), and the haplotype matrix (`<root>.hap[s][.gz]`).
//! Any input ending in `.gz` is decompressed transparently. Search results
//! go out as TSV or JSON.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use log::info;

use crate::index::{DataMode, HapIndex};

pub mod hap;
pub mod json;
pub mod map;
pub mod sample;
pub mod tsv;

/// Load a haplotype panel from `<file_root>.{sample[s],map[.gz],hap[s][.gz]}`
/// and build the index. `map_path` overrides the map lookup next to the
/// root.
pub fn load_index(
    mode: DataMode,
    file_root: &str,
    word_size: usize,
    map_path: Option<&str>,
) -> Result<HapIndex> {
    let sample_path = resolve_input(file_root, &[".samples", ".sample"], "sample manifest")?;
    let sample_names = sample::read_samples(open_text(&sample_path)?)
        .with_context(|| format!("Malformed sample manifest {}", sample_path.display()))?;
    info!(
        "Read {} haplotype names from {}",
        sample_names.len(),
        sample_path.display()
    );

    let map_path = match map_path {
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.is_file() {
                bail!("Could not open map file {}, no such file", path.display());
            }
            path
        }
        None => resolve_input(file_root, &[".map.gz", ".map"], "genetic map")?,
    };
    let (genetic_positions, physical_positions) = map::read_map(open_text(&map_path)?)
        .with_context(|| format!("Malformed genetic map {}", map_path.display()))?;
    info!(
        "Read {} sites from {}",
        genetic_positions.len(),
        map_path.display()
    );

    let hap_path = resolve_input(
        file_root,
        &[".hap.gz", ".hap", ".haps.gz", ".haps"],
        "haplotype matrix",
    )?;
    let site_rows = hap::site_rows(open_text(&hap_path)?, sample_names.len());
    let index = HapIndex::new(
        mode,
        word_size,
        sample_names,
        physical_positions,
        genetic_positions,
        site_rows,
    )
    .with_context(|| format!("Could not index haplotype matrix {}", hap_path.display()))?;
    info!("{index}");

    Ok(index)
}

/// Open a text input, decompressing on the fly when the path ends in `.gz`.
fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// The first `<file_root><extension>` candidate that exists on disk.
fn resolve_input(file_root: &str, extensions: &[&str], what: &str) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = extensions
        .iter()
        .map(|ext| PathBuf::from(format!("{file_root}{ext}")))
        .collect();
    for candidate in &candidates {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }
    let tried: Vec<String> = candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect();
    bail!("Could not find {what} file in {}", tried.join(" or "));
}
