//! # The haplotype index
//!
//! [`HapIndex`] ties the packed word matrix and the site metadata together
//! with the per-word-column hash maps that drive the cousin search. Columns
//! map each 64-bit word value to the registered haplotypes carrying it, so
//! a query can seed match candidates with one hash lookup per column.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::{matrix::PackedHaplotypes, sites::SiteInfo};

/// Whether the indexed panel is whole-sequence or genotyping-array data.
/// Stored as a construction-time hint; no index operation branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Sequence,
    Array,
}

impl DataMode {
    pub fn name(&self) -> &str {
        match self {
            DataMode::Sequence => "sequence",
            DataMode::Array => "array",
        }
    }
}

impl FromStr for DataMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<DataMode> {
        match s {
            "sequence" => Ok(DataMode::Sequence),
            "array" => Ok(DataMode::Array),
            other => bail!("Mode must be 'sequence' or 'array', got '{other}'"),
        }
    }
}

/// An indexed panel of haplotypes. The matrix, site metadata, and sample
/// names are fixed at construction; the word-column hash maps grow as
/// haplotypes are registered with [`HapIndex::add_to_hash`].
#[derive(Debug)]
pub struct HapIndex {
    mode: DataMode,
    haps: PackedHaplotypes,
    sites: SiteInfo,
    sample_names: Vec<String>,
    hashes: Vec<HashMap<u64, Vec<usize>>>,
    hashed_hap_ids: HashSet<usize>,
}

impl HapIndex {
    /// Build an index from parsed inputs: one haplotype name per matrix row,
    /// the two map position arrays, and a stream of per-site allele rows.
    /// See [`PackedHaplotypes::from_sites`] for the packing contract.
    pub fn new<I>(
        mode: DataMode,
        word_size: usize,
        sample_names: Vec<String>,
        physical_positions: Vec<u64>,
        genetic_positions: Vec<f64>,
        site_rows: I,
    ) -> Result<HapIndex>
    where
        I: IntoIterator<Item = Result<Vec<bool>>>,
    {
        let num_sites = genetic_positions.len();
        let (haps, site_mafs) =
            PackedHaplotypes::from_sites(sample_names.len(), num_sites, word_size, site_rows)?;
        let sites = SiteInfo::new(physical_positions, genetic_positions, site_mafs)?;

        Ok(HapIndex {
            mode,
            haps,
            sites,
            sample_names,
            hashes: Vec::new(),
            hashed_hap_ids: HashSet::new(),
        })
    }

    /// Register haplotype `hap_id`: append it to the bucket for its word
    /// value in every word column. The column maps are allocated lazily on
    /// the first registration. Registering an ID twice is an error.
    pub fn add_to_hash(&mut self, hap_id: usize) -> Result<()> {
        if self.hashed_hap_ids.contains(&hap_id) {
            bail!("Haplotype {hap_id} has already been hashed");
        }
        if hap_id >= self.num_haps() {
            bail!(
                "Haplotype ID {hap_id} out of bounds for a panel of {} haplotypes",
                self.num_haps()
            );
        }

        if self.hashes.is_empty() {
            self.hashes = vec![HashMap::new(); self.haps.num_words()];
        }
        for word_id in 0..self.haps.num_words() {
            self.hashes[word_id]
                .entry(self.haps.word(hap_id, word_id))
                .or_default()
                .push(hap_id);
        }
        self.hashed_hap_ids.insert(hap_id);

        Ok(())
    }

    /// The registered haplotypes whose word in column `word_id` equals
    /// `word`, in registration order. `None` when no registered haplotype
    /// carries that word value (or nothing is registered yet); the lookup
    /// never creates an entry.
    pub fn bucket(&self, word_id: usize, word: u64) -> Option<&[usize]> {
        self.hashes
            .get(word_id)
            .and_then(|column| column.get(&word))
            .map(Vec::as_slice)
    }

    pub fn hashed_hap_ids(&self) -> &HashSet<usize> {
        &self.hashed_hap_ids
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }
    pub fn haps(&self) -> &PackedHaplotypes {
        &self.haps
    }
    pub fn sites(&self) -> &SiteInfo {
        &self.sites
    }
    pub fn num_haps(&self) -> usize {
        self.haps.num_haps()
    }
    pub fn num_sites(&self) -> usize {
        self.haps.num_sites()
    }
    pub fn num_words(&self) -> usize {
        self.haps.num_words()
    }
    pub fn word_size(&self) -> usize {
        self.haps.word_size()
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn sample_name(&self, hap_id: usize) -> Result<&str> {
        self.sample_names
            .get(hap_id)
            .map(String::as_str)
            .with_context(|| {
                format!(
                    "Haplotype ID {hap_id} out of bounds for a panel of {} haplotypes",
                    self.num_haps()
                )
            })
    }

    /// Render the site bits (grouped per word) and the packed words (hex)
    /// of one haplotype.
    pub fn format_hap(&self, hap_id: usize) -> Result<String> {
        if hap_id >= self.num_haps() {
            bail!(
                "Haplotype ID {hap_id} out of bounds for a panel of {} haplotypes",
                self.num_haps()
            );
        }

        let mut out = format!("Bits for haplotype {hap_id}\n");
        for site_id in 0..self.num_sites() {
            out.push(if self.haps.bit(hap_id, site_id) { '1' } else { '0' });
            if (site_id + 1) % self.word_size() == 0 {
                out.push(' ');
            }
        }
        out.push('\n');

        out.push_str(&format!("Words (hex) for haplotype {hap_id}\n"));
        for word_id in 0..self.num_words() {
            out.push_str(&format!("{:#x} ", self.haps.word(hap_id, word_id)));
        }
        out.push('\n');

        Ok(out)
    }

    /// Render every hash column as `bits: ids` lines. Keys are printed in
    /// site order over the bits in use for the column (the last column may
    /// be partial), sorted by word value so the output is stable.
    pub fn format_hashes(&self) -> String {
        let mut out = String::new();
        for (word_id, column) in self.hashes.iter().enumerate() {
            out.push_str(&format!("Hash for word {word_id} of {}\n", self.hashes.len()));
            let num_bits = if word_id == self.hashes.len() - 1 {
                (self.num_sites() - 1) % self.word_size() + 1
            } else {
                self.word_size()
            };

            let mut entries: Vec<(&u64, &Vec<usize>)> = column.iter().collect();
            entries.sort_unstable_by_key(|(word, _)| **word);
            for (word, hap_ids) in entries {
                for bit in 0..num_bits {
                    out.push(if word >> bit & 1 == 1 { '1' } else { '0' });
                }
                out.push(':');
                for hap_id in hap_ids {
                    out.push_str(&format!(" {hap_id}"));
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Word-by-word agreement between two haplotypes: `x` where the packed
    /// words are identical, `_` where they differ. 25 words per line, in
    /// groups of five.
    pub fn match_diagram(&self, hap_a: usize, hap_b: usize) -> Result<String> {
        if hap_a >= self.num_haps() || hap_b >= self.num_haps() {
            bail!(
                "Haplotype pair ({hap_a}, {hap_b}) out of bounds for a panel of {} haplotypes",
                self.num_haps()
            );
        }

        let mut out = String::new();
        for word_id in 0..self.num_words() {
            if word_id != 0 {
                if word_id % 25 == 0 {
                    out.push('\n');
                } else if word_id % 5 == 0 {
                    out.push(' ');
                }
            }
            out.push(if self.haps.word(hap_a, word_id) == self.haps.word(hap_b, word_id) {
                'x'
            } else {
                '_'
            });
        }
        out.push('\n');

        Ok(out)
    }
}

impl fmt::Display for HapIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HapIndex with {} haplotypes and {} sites, word size = {} bits, {} data",
            self.num_haps(),
            self.num_sites(),
            self.word_size(),
            self.mode.name()
        )
    }
}
