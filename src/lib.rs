//! # hapcousins
//!
//! This library is the backbone of the `hapcousins` binary. It indexes a
//! population of binary haplotypes as bit-packed 64-bit words, hashes each
//! word column, and answers the question: which other haplotypes share the
//! longest stretches of identical material with a query, per genomic
//! window? Long shared stretches imply recent common ancestry, so the
//! per-window top scorers are the query's closest cousins.
pub mod cli;
pub mod index;
pub mod io;
pub mod matrix;
pub mod search;
pub mod sites;
pub mod windows;

use anyhow::Result;
use log::debug;

use crate::{index::HapIndex, search::QueryCousins};

/// Run the all-pairs cousin sweep over a freshly built index: walk the
/// haplotypes in ascending ID order, query each one against the haplotypes
/// registered so far, then register it. Every pair is thereby scored
/// exactly once, and the `v < h` candidate-pool precondition of
/// [`search::closest_cousins`] holds for every query.
pub fn run(
    index: &mut HapIndex,
    k: usize,
    tolerance: usize,
    window_size_genetic: f64,
) -> Result<Vec<QueryCousins>> {
    let mut results = Vec::with_capacity(index.num_haps());
    for hap_id in 0..index.num_haps() {
        let windows = search::closest_cousins(index, hap_id, k, tolerance, window_size_genetic)?;
        results.push(QueryCousins { hap_id, windows });
        index.add_to_hash(hap_id)?;
        debug!("Queried and registered haplotype {hap_id}");
    }

    Ok(results)
}
