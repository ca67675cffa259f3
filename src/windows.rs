//! # Genomic windows over word columns
//!
//! Cousin scores are reported per window, where a window is a contiguous
//! run of word columns. Windows either coincide with single words (trivial
//! mode) or are grown until they span a minimum genetic distance.

/// A half-open range of word columns, `[start, end)`, with its dense index
/// in the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub index: usize,
}

/// Partition the word columns `[0, num_words)` into contiguous windows.
///
/// With `window_size_genetic <= 0` every word becomes its own window.
/// Otherwise windows are grown greedily: a window closes at word `j` once
/// it spans at least `window_size_genetic` (measured from the first site of
/// its first word to the last site of word `j`) *and* the remaining suffix
/// still spans at least `window_size_genetic`, so the partition never ends
/// in a degenerate short window. The last window absorbs the tail.
///
/// # Examples
///
/// ```
/// use hapcousins::windows::partition;
///
/// let genetic: Vec<f64> = (0..8).map(|s| s as f64 * 0.01).collect();
/// let windows = partition(2, 4, &genetic, 0.0);
/// assert_eq!(windows.len(), 2);
/// assert_eq!((windows[1].start, windows[1].end), (1, 2));
/// ```
pub fn partition(
    num_words: usize,
    word_size: usize,
    genetic_positions: &[f64],
    window_size_genetic: f64,
) -> Vec<Window> {
    let mut windows = Vec::new();
    if num_words == 0 {
        return windows;
    }

    if window_size_genetic <= 0.0 {
        for j in 0..num_words {
            windows.push(Window {
                start: j,
                end: j + 1,
                index: j,
            });
        }
        return windows;
    }

    let num_sites = genetic_positions.len();
    let mut start_word = 0;
    let mut start_genetic = genetic_positions[0];
    for j in 0..num_words {
        let last_word_site = ((j + 1) * word_size - 1).min(num_sites - 1);
        // close only when enough genetic span remains to fit at least one
        // more full window after this one
        if j == num_words - 1
            || (genetic_positions[last_word_site] - start_genetic >= window_size_genetic
                && genetic_positions[num_sites - 1] - genetic_positions[last_word_site + 1]
                    >= window_size_genetic)
        {
            windows.push(Window {
                start: start_word,
                end: j + 1,
                index: windows.len(),
            });
            start_word = j + 1;
            if last_word_site + 1 < num_sites {
                start_genetic = genetic_positions[last_word_site + 1];
            }
        }
    }

    windows
}

/// The reverse lookup: for every word column, the index of the window
/// containing it.
pub fn word_to_window(windows: &[Window]) -> Vec<usize> {
    let mut lookup = Vec::new();
    for window in windows {
        for _ in window.start..window.end {
            lookup.push(window.index);
        }
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_map(num_sites: usize) -> Vec<f64> {
        (0..num_sites)
            .map(|s| s as f64 / (num_sites - 1) as f64)
            .collect()
    }

    fn assert_partition_covers(windows: &[Window], num_words: usize) {
        let mut next = 0;
        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.index, i);
            assert_eq!(window.start, next);
            assert!(window.end > window.start);
            next = window.end;
        }
        assert_eq!(next, num_words);
    }

    #[test]
    fn trivial_mode_puts_every_word_in_its_own_window() {
        let windows = partition(5, 4, &linear_map(20), 0.0);
        assert_eq!(windows.len(), 5);
        assert_partition_covers(&windows, 5);
        for window in &windows {
            assert_eq!(window.end, window.start + 1);
            assert_eq!(window.index, window.start);
        }
    }

    #[test]
    fn genetic_mode_splits_a_chromosome_in_two() {
        // 256 sites spread linearly over one morgan-like unit, four words:
        // a 0.3 minimum yields [0, 2) and [2, 4), since the suffix after
        // word 1 (0.5) cannot fit two more windows
        let windows = partition(4, 64, &linear_map(256), 0.3);
        assert_eq!(
            windows,
            vec![
                Window { start: 0, end: 2, index: 0 },
                Window { start: 2, end: 4, index: 1 },
            ]
        );
    }

    #[test]
    fn final_window_absorbs_the_tail() {
        // the span is too short to ever leave room for a second window
        let windows = partition(4, 4, &linear_map(16), 0.9);
        assert_eq!(windows.len(), 1);
        assert_eq!((windows[0].start, windows[0].end), (0, 4));
    }

    #[test]
    fn partial_last_word_is_covered() {
        // 10 sites over 3 words of 4; last word holds 2 sites
        let windows = partition(3, 4, &linear_map(10), 0.25);
        assert_partition_covers(&windows, 3);
    }

    #[test]
    fn every_non_terminal_window_spans_the_minimum() {
        let genetic = linear_map(96);
        let word_size = 8;
        let windows = partition(12, word_size, &genetic, 0.2);
        assert_partition_covers(&windows, 12);
        assert!(windows.len() > 1);
        for window in &windows[..windows.len() - 1] {
            let first_site = window.start * word_size;
            let last_site = (window.end * word_size - 1).min(genetic.len() - 1);
            assert!(genetic[last_site] - genetic[first_site] >= 0.2);
        }
    }

    #[test]
    fn reverse_lookup_agrees_with_the_partition() {
        let windows = partition(12, 8, &linear_map(96), 0.2);
        let lookup = word_to_window(&windows);
        assert_eq!(lookup.len(), 12);
        for window in &windows {
            for word in window.start..window.end {
                assert_eq!(lookup[word], window.index);
            }
        }
    }

    #[test]
    fn empty_axis_yields_no_windows() {
        assert!(partition(0, 64, &[], 0.5).is_empty());
        assert!(word_to_window(&[]).is_empty());
    }
}
