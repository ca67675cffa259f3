//! # Closest-cousin search
//!
//! The query algorithm: scan the query haplotype's word row, seed match
//! candidates from the per-column hash buckets, and track per-candidate
//! stretches of matching words that may be interrupted by up to `tolerance`
//! mismatching words. The best stretch length each candidate achieves is
//! scored into every window the stretch overlaps, and the top `k`
//! candidates per window are reported.
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use anyhow::{bail, Result};
use serde::Serialize;

use crate::{index::HapIndex, windows};

/// A match pair is a half-open word range; the sentinel fills one
/// mismatching word. Sentinels are recognizable by their zero end word
/// (a real pair always ends at word 1 or later).
const SENTINEL: (usize, usize) = (0, 0);

/// One cousin of the query haplotype in one window: the candidate's ID and
/// the length in words of its best stretch overlapping the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cousin {
    pub hap_id: usize,
    pub score: usize,
}

/// The top cousins of one genomic window. Site bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowCousins {
    pub start_site: usize,
    pub end_site: usize,
    pub cousins: Vec<Cousin>,
}

/// The full result of one query: the windows in increasing order, each with
/// its top cousins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCousins {
    pub hap_id: usize,
    pub windows: Vec<WindowCousins>,
}

/// Find the top-`k` closest cousins of haplotype `hap_id` per genomic
/// window.
///
/// The candidate pool is the registered set, which must contain only IDs
/// strictly below `hap_id`: callers register haplotypes in ascending ID
/// order and query each one before registering it, so every pair is
/// counted exactly once. Any registered ID at or above `hap_id` is an
/// error. Querying with nothing registered yields the window partition
/// with empty cousin lists.
pub fn closest_cousins(
    index: &HapIndex,
    hap_id: usize,
    k: usize,
    tolerance: usize,
    window_size_genetic: f64,
) -> Result<Vec<WindowCousins>> {
    if hap_id >= index.num_haps() {
        bail!(
            "Haplotype ID {hap_id} out of bounds for a panel of {} haplotypes",
            index.num_haps()
        );
    }
    if let Some(&bad) = index.hashed_hap_ids().iter().find(|&&id| id >= hap_id) {
        bail!(
            "Haplotype {bad} is registered but the query for {hap_id} may only see lower IDs; \
             register in ascending order and query each haplotype before registering it"
        );
    }

    let num_words = index.num_words();
    let word_size = index.word_size();
    let windows = windows::partition(
        num_words,
        word_size,
        index.sites().genetic_positions(),
        window_size_genetic,
    );
    let word_to_window = windows::word_to_window(&windows);

    // per-window candidate scores; only candidates that matched are present
    let mut window_scores: Vec<HashMap<usize, usize>> = vec![HashMap::new(); windows.len()];
    // per-candidate stretch deques: match pairs separated by 2*m - 1
    // sentinels for a run of m mismatches, so the deque length stays
    // 2 * (mismatches spanned) + 1 while it starts and ends with a match
    let mut stretches: Vec<VecDeque<(usize, usize)>> = vec![VecDeque::new(); hap_id];
    let deque_cap = 2 * tolerance + 1;

    for i in 0..num_words {
        let Some(bucket) = index.bucket(i, index.haps().word(hap_id, i)) else {
            continue;
        };
        for &candidate in bucket {
            let deque = &mut stretches[candidate];
            match deque.back().copied() {
                None => deque.push_back((i, i + 1)),
                Some((_, end)) if end == i => {
                    if let Some(back) = deque.back_mut() {
                        back.1 = i + 1;
                    }
                }
                Some((_, end)) => {
                    // runs longer than tolerance + 1 mismatches all break
                    // the stretch the same way, so clamp the filler count
                    let mismatches = (tolerance + 1).min(i - end);
                    for _ in 0..2 * mismatches - 1 {
                        deque.push_back(SENTINEL);
                    }
                    deque.push_back((i, i + 1));
                }
            }

            while deque.len() > deque_cap {
                let front = deque[0];
                if front.1 != 0 {
                    let range_end = stretch_end(deque, deque_cap);
                    record_stretch(&mut window_scores, &word_to_window, candidate, front.0, range_end);
                }
                deque.pop_front();
            }
        }
    }

    // drain what is left in every deque; remaining entries all sit within
    // tolerance of the front, so the same scoring rule applies
    for (candidate, deque) in stretches.iter_mut().enumerate() {
        while let Some(front) = deque.front().copied() {
            if front.1 != 0 {
                let range_end = stretch_end(deque, deque_cap);
                record_stretch(&mut window_scores, &word_to_window, candidate, front.0, range_end);
            }
            deque.pop_front();
        }
    }

    let num_sites = index.num_sites();
    let mut results = Vec::with_capacity(windows.len());
    for window in &windows {
        let mut cousins: Vec<Cousin> = window_scores[window.index]
            .iter()
            .map(|(&hap_id, &score)| Cousin { hap_id, score })
            .collect();
        let top = k.min(cousins.len());
        if top > 0 && top < cousins.len() {
            cousins.select_nth_unstable_by(top - 1, rank);
        }
        cousins.truncate(top);
        cousins.sort_unstable_by(rank);

        results.push(WindowCousins {
            start_site: window.start * word_size,
            end_site: (window.end * word_size - 1).min(num_sites - 1),
            cousins,
        });
    }

    Ok(results)
}

/// Descending score, ties broken by ascending candidate ID so output is
/// deterministic.
fn rank(a: &Cousin, b: &Cousin) -> Ordering {
    b.score.cmp(&a.score).then(a.hap_id.cmp(&b.hap_id))
}

/// End of the stretch anchored at the deque front: the furthest end word
/// among the first `2 * tolerance + 1` entries. Anything further back is
/// separated from the front by more than `tolerance` mismatches and belongs
/// to a later stretch.
fn stretch_end(deque: &VecDeque<(usize, usize)>, deque_cap: usize) -> usize {
    deque
        .iter()
        .take(deque_cap)
        .map(|&(_, end)| end)
        .max()
        .unwrap_or(0)
}

/// Fold the stretch `[range_start, range_end)` into the best-score table of
/// every window it overlaps.
fn record_stretch(
    window_scores: &mut [HashMap<usize, usize>],
    word_to_window: &[usize],
    candidate: usize,
    range_start: usize,
    range_end: usize,
) {
    let range_size = range_end - range_start;
    for window_index in word_to_window[range_start]..=word_to_window[range_end - 1] {
        let best = window_scores[window_index].entry(candidate).or_insert(0);
        if range_size > *best {
            *best = range_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DataMode;

    /// Index the given haplotype bit strings with evenly spaced sites.
    fn indexed(haps: &[&str], word_size: usize) -> HapIndex {
        let num_sites = haps[0].len();
        let names = (0..haps.len()).map(|i| format!("hap{i}")).collect();
        let physical = (0..num_sites as u64).map(|s| 1000 + s * 100).collect();
        let genetic = (0..num_sites).map(|s| s as f64 * 0.01).collect();
        let rows: Vec<Result<Vec<bool>>> = (0..num_sites)
            .map(|site| Ok(haps.iter().map(|hap| hap.as_bytes()[site] == b'1').collect()))
            .collect();

        HapIndex::new(DataMode::Sequence, word_size, names, physical, genetic, rows).unwrap()
    }

    fn register(index: &mut HapIndex, hap_ids: &[usize]) {
        for &hap_id in hap_ids {
            index.add_to_hash(hap_id).unwrap();
        }
    }

    fn cousins(windows: &[WindowCousins]) -> Vec<Vec<(usize, usize)>> {
        windows
            .iter()
            .map(|w| w.cousins.iter().map(|c| (c.hap_id, c.score)).collect())
            .collect()
    }

    #[test]
    fn finds_single_word_cousins_per_window() {
        let mut index = indexed(
            &["11111111", "11110000", "11111111", "00001111"],
            4,
        );
        register(&mut index, &[0, 1, 2]);

        let results = closest_cousins(&index, 3, 2, 0, 0.0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!((results[0].start_site, results[0].end_site), (0, 3));
        assert_eq!((results[1].start_site, results[1].end_site), (4, 7));
        // no registered haplotype shares word 0 with the query; both
        // all-ones carriers share word 1
        assert_eq!(cousins(&results), vec![vec![], vec![(0, 1), (2, 1)]]);
    }

    #[test]
    fn tolerance_bridges_a_single_mismatching_word() {
        // query and candidate agree on words 0 and 2 and differ on word 1
        let mut index = indexed(&["101001101010", "101011111010"], 4);
        register(&mut index, &[0]);

        let bridged = closest_cousins(&index, 1, 4, 1, 0.0).unwrap();
        assert_eq!(
            cousins(&bridged),
            vec![vec![(0, 3)], vec![(0, 3)], vec![(0, 3)]]
        );

        let broken = closest_cousins(&index, 1, 4, 0, 0.0).unwrap();
        assert_eq!(cousins(&broken), vec![vec![(0, 1)], vec![], vec![(0, 1)]]);
    }

    #[test]
    fn zero_tolerance_scores_adjacent_matches_only() {
        // words 0 and 1 match, then the candidate diverges for good
        let mut index = indexed(&["1010101011111111", "1010101000000000"], 4);
        register(&mut index, &[0]);

        let results = closest_cousins(&index, 1, 4, 0, 0.0).unwrap();
        assert_eq!(
            cousins(&results),
            vec![vec![(0, 2)], vec![(0, 2)], vec![], vec![]]
        );
    }

    #[test]
    fn long_gaps_break_stretches_even_with_tolerance() {
        // matches at words 0 and 3 only; the two-word gap exceeds tolerance 1
        let mut index = indexed(&["1010011001101010", "1010111111111010"], 4);
        register(&mut index, &[0]);

        let results = closest_cousins(&index, 1, 4, 1, 0.0).unwrap();
        assert_eq!(
            cousins(&results),
            vec![vec![(0, 1)], vec![], vec![], vec![(0, 1)]]
        );
    }

    #[test]
    fn rolling_stretches_score_during_the_scan() {
        // matches at words 0, 2, and 4; with tolerance 1 the deque fills and
        // trims mid-scan, scoring [0, 3) before the flush handles [2, 5)
        let mut index = indexed(&["10100110101001101010", "10101111101011111010"], 4);
        register(&mut index, &[0]);

        let results = closest_cousins(&index, 1, 4, 1, 0.0).unwrap();
        assert_eq!(
            cousins(&results),
            vec![
                vec![(0, 3)],
                vec![(0, 3)],
                vec![(0, 3)],
                vec![(0, 3)],
                vec![(0, 3)],
            ]
        );
    }

    #[test]
    fn all_zero_words_are_ordinary_values() {
        let mut index = indexed(&["00000000", "00000000"], 4);
        register(&mut index, &[0]);

        let results = closest_cousins(&index, 1, 1, 0, 0.0).unwrap();
        assert_eq!(cousins(&results), vec![vec![(0, 2)], vec![(0, 2)]]);
    }

    #[test]
    fn stretches_score_into_genetic_windows() {
        // one window over both words: per-candidate bests merge
        let mut index = indexed(
            &["11111111", "11110000", "11111111", "00001111"],
            4,
        );
        register(&mut index, &[0, 1, 2]);

        let results = closest_cousins(&index, 3, 2, 0, 1.0).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].start_site, results[0].end_site), (0, 7));
        assert_eq!(cousins(&results), vec![vec![(0, 1), (2, 1)]]);
    }

    #[test]
    fn k_zero_still_emits_windows() {
        let mut index = indexed(&["1111", "1111"], 4);
        register(&mut index, &[0]);

        let results = closest_cousins(&index, 1, 0, 0, 0.0).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].cousins.is_empty());
    }

    #[test]
    fn k_caps_the_number_of_cousins() {
        let mut index = indexed(&["1111", "1111", "1111", "1111"], 4);
        register(&mut index, &[0, 1, 2]);

        let results = closest_cousins(&index, 3, 2, 0, 0.0).unwrap();
        assert_eq!(cousins(&results), vec![vec![(0, 1), (1, 1)]]);
    }

    #[test]
    fn querying_an_empty_index_yields_empty_windows() {
        let index = indexed(&["1111", "1111"], 4);
        let results = closest_cousins(&index, 0, 3, 0, 0.0).unwrap();
        assert_eq!(cousins(&results), vec![vec![]]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut index = indexed(
            &["1111000011110000", "1111111100000000", "1111000011110000"],
            4,
        );
        register(&mut index, &[0, 1]);

        let first = closest_cousins(&index, 2, 2, 1, 0.0).unwrap();
        let second = closest_cousins(&index, 2, 2, 1, 0.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_out_of_bounds_query() {
        let index = indexed(&["1111", "1111"], 4);
        assert!(closest_cousins(&index, 2, 1, 0, 0.0).is_err());
    }

    #[test]
    fn rejects_candidates_at_or_above_the_query() {
        let mut index = indexed(&["1111", "1111", "1111"], 4);
        register(&mut index, &[0, 2]);

        let err = closest_cousins(&index, 1, 1, 0, 0.0).unwrap_err();
        assert!(err.to_string().contains("ascending order"));
        // the query haplotype itself must not be registered either
        let mut index = indexed(&["1111", "1111"], 4);
        register(&mut index, &[0, 1]);
        assert!(closest_cousins(&index, 1, 1, 0, 0.0).is_err());
    }
}
