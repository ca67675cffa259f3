//! # Per-site metadata
//!
//! Physical positions, genetic map positions, and minor allele frequencies
//! for every site in the indexed panel. The arrays are parallel and
//! immutable after construction.
use anyhow::{bail, Result};

/// Site-level annotation of a haplotype panel: one entry per site, in site
/// order. Genetic positions come from the genetic map and must be
/// non-decreasing; minor allele frequencies are computed while packing the
/// haplotype matrix and are always in `[0, 0.5]`.
#[derive(Debug)]
pub struct SiteInfo {
    physical_positions: Vec<u64>,
    genetic_positions: Vec<f64>,
    site_mafs: Vec<f32>,
}

impl SiteInfo {
    pub fn new(
        physical_positions: Vec<u64>,
        genetic_positions: Vec<f64>,
        site_mafs: Vec<f32>,
    ) -> Result<SiteInfo> {
        if physical_positions.len() != genetic_positions.len()
            || site_mafs.len() != genetic_positions.len()
        {
            bail!(
                "Site annotation arrays disagree in length: {} physical positions, {} genetic positions, {} allele frequencies",
                physical_positions.len(),
                genetic_positions.len(),
                site_mafs.len()
            );
        }
        if let Some(pair) = genetic_positions.windows(2).find(|pair| pair[1] < pair[0]) {
            bail!(
                "Genetic positions must be non-decreasing, found {} after {}",
                pair[1],
                pair[0]
            );
        }
        if let Some(maf) = site_mafs.iter().find(|maf| !(0.0..=0.5).contains(*maf)) {
            bail!("Minor allele frequencies must be in [0, 0.5], found {maf}");
        }

        Ok(SiteInfo {
            physical_positions,
            genetic_positions,
            site_mafs,
        })
    }

    pub fn num_sites(&self) -> usize {
        self.genetic_positions.len()
    }
    pub fn physical_positions(&self) -> &[u64] {
        &self.physical_positions
    }
    pub fn genetic_positions(&self) -> &[f64] {
        &self.genetic_positions
    }
    pub fn site_mafs(&self) -> &[f32] {
        &self.site_mafs
    }
}
