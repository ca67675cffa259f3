//! # Bit-packed haplotype matrix
//!
//! Module that packs a stream of per-site allele rows into the word matrix
//! the rest of the library operates on. Each haplotype is one matrix row of
//! 64-bit words; site `s` occupies bit `s % word_size` of word
//! `s / word_size`. Minor allele frequencies are tallied during the same
//! pass over the input.
use anyhow::{bail, Result};
use ndarray::prelude::*;

/// Sites per word may not exceed the bits of the word type.
pub const MAX_WORD_SIZE: usize = 64;

/// `PackedHaplotypes` is the packed bit matrix: `num_haps` rows by
/// `ceil(num_sites / word_size)` word columns. Unused high bits of the last
/// word column are always zero. The matrix is immutable after construction.
#[derive(Debug)]
pub struct PackedHaplotypes {
    words: Array2<u64>,
    num_sites: usize,
    word_size: usize,
}

impl PackedHaplotypes {
    /// Pack a site stream into a word matrix. `site_rows` must yield exactly
    /// `num_sites` rows of `num_haps` alleles each, in site order. Returns
    /// the matrix together with the per-site minor allele frequencies
    /// observed in the stream.
    pub fn from_sites<I>(
        num_haps: usize,
        num_sites: usize,
        word_size: usize,
        site_rows: I,
    ) -> Result<(PackedHaplotypes, Vec<f32>)>
    where
        I: IntoIterator<Item = Result<Vec<bool>>>,
    {
        if word_size == 0 || word_size > MAX_WORD_SIZE {
            bail!("Word size must be between 1 and {MAX_WORD_SIZE}, got {word_size}");
        }
        if num_haps == 0 {
            bail!("Cannot pack a panel of zero haplotypes");
        }

        let num_words = (num_sites + word_size - 1) / word_size;
        let mut words = Array2::<u64>::zeros((num_haps, num_words));
        let mut site_mafs = Vec::with_capacity(num_sites);

        let mut site_id = 0;
        for row in site_rows {
            let row = row?;
            if site_id == num_sites {
                bail!("Site stream has more than the expected {num_sites} sites");
            }
            if row.len() != num_haps {
                bail!(
                    "Site {site_id} has {} alleles, expected one per haplotype ({num_haps})",
                    row.len()
                );
            }

            let mut carriers = 0;
            for (hap_id, &allele) in row.iter().enumerate() {
                if allele {
                    carriers += 1;
                    // each (site, haplotype) pair is visited exactly once,
                    // so toggling the bit is the same as setting it
                    words[[hap_id, site_id / word_size]] ^= 1u64 << (site_id % word_size);
                }
            }
            let mut maf = carriers as f32 / num_haps as f32;
            if maf > 0.5 {
                maf = 1.0 - maf;
            }
            site_mafs.push(maf);
            site_id += 1;
        }
        if site_id != num_sites {
            bail!("Site stream ended after {site_id} sites, expected {num_sites}");
        }

        Ok((
            PackedHaplotypes {
                words,
                num_sites,
                word_size,
            },
            site_mafs,
        ))
    }

    /// The packed word in column `word_id` of haplotype `hap_id`.
    pub fn word(&self, hap_id: usize, word_id: usize) -> u64 {
        self.words[[hap_id, word_id]]
    }

    /// The allele of `hap_id` at `site_id`, recovered from the packed words.
    pub fn bit(&self, hap_id: usize, site_id: usize) -> bool {
        self.words[[hap_id, site_id / self.word_size]] >> (site_id % self.word_size) & 1 == 1
    }

    pub fn num_haps(&self) -> usize {
        self.words.nrows()
    }
    pub fn num_words(&self) -> usize {
        self.words.ncols()
    }
    pub fn num_sites(&self) -> usize {
        self.num_sites
    }
    pub fn word_size(&self) -> usize {
        self.word_size
    }
}
