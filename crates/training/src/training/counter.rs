//! Pair counting for BPE training.
//!
//! Training chunks are deduplicated up front: each distinct chunk is stored
//! once with its multiplicity, so counting weights every pair by how many
//! times the chunk occurred. Counting fans out over chunks with rayon and
//! folds back into a single `PairStats`.

use ahash::AHashMap;
use bytepair_core::{merge, Pair, PairStats, TokenId};
use rayon::prelude::*;

/// Distinct training chunks and their pair counts.
#[derive(Debug, Clone, Default)]
pub struct PairCounter {
    /// Distinct chunks as token IDs
    words: Vec<Vec<TokenId>>,
    /// Occurrences of each chunk
    word_counts: Vec<u64>,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a counter from chunk bytes, deduplicating identical chunks.
    ///
    /// Chunks shorter than two bytes can never hold a pair and are skipped.
    pub fn from_chunks<S: AsRef<[u8]>>(chunks: &[S]) -> Self {
        let mut index: AHashMap<&[u8], usize> = AHashMap::new();
        let mut counter = Self::new();

        for chunk in chunks {
            let bytes = chunk.as_ref();
            if bytes.len() < 2 {
                continue;
            }
            match index.get(bytes) {
                Some(&pos) => counter.word_counts[pos] += 1,
                None => {
                    index.insert(bytes, counter.words.len());
                    counter
                        .words
                        .push(bytes.iter().map(|&b| TokenId::from(b)).collect());
                    counter.word_counts.push(1);
                }
            }
        }

        counter
    }

    /// Count all pairs, in parallel or sequentially.
    pub fn count_pairs(&self, parallel: bool) -> PairStats {
        if parallel {
            self.count_pairs_parallel()
        } else {
            self.count_pairs_sequential()
        }
    }

    /// Count all pairs in parallel.
    pub fn count_pairs_parallel(&self) -> PairStats {
        self.words
            .par_iter()
            .zip(self.word_counts.par_iter())
            .fold(PairStats::new, |mut acc, (word, &count)| {
                acc.add_ids_weighted(word, count);
                acc
            })
            .reduce(PairStats::new, |mut acc, stats| {
                acc.merge_from(stats);
                acc
            })
    }

    /// Count all pairs sequentially (for debugging or single-threaded use).
    pub fn count_pairs_sequential(&self) -> PairStats {
        let mut stats = PairStats::new();
        for (word, &count) in self.words.iter().zip(self.word_counts.iter()) {
            stats.add_ids_weighted(word, count);
        }
        stats
    }

    /// Replace `pair` with `new_token_id` in every chunk.
    ///
    /// The chunk table is rebuilt and swapped in rather than edited in place.
    pub fn merge_pair(&mut self, pair: Pair, new_token_id: TokenId, parallel: bool) {
        let words = if parallel {
            self.words
                .par_iter()
                .map(|word| merge(word, pair, new_token_id))
                .collect()
        } else {
            self.words
                .iter()
                .map(|word| merge(word, pair, new_token_id))
                .collect()
        };
        self.words = words;
    }

    /// Get the number of distinct chunks.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Upper bound on how many merges these chunks can still take.
    pub fn max_merges(&self) -> usize {
        self.words.iter().map(|w| w.len().saturating_sub(1)).sum()
    }

    /// Get the total count of all chunk occurrences.
    pub fn total_word_occurrences(&self) -> u64 {
        self.word_counts.iter().sum()
    }

    /// Get a reference to the chunks.
    pub fn words(&self) -> &[Vec<TokenId>] {
        &self.words
    }

    /// Get a reference to the chunk counts.
    pub fn word_counts(&self) -> &[u64] {
        &self.word_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chunks_dedupes() {
        let counter = PairCounter::from_chunks(&["ab", "cd", "ab", "x", ""]);

        assert_eq!(counter.word_count(), 2);
        assert_eq!(counter.total_word_occurrences(), 3);
        assert_eq!(counter.words()[0].as_slice(), &[97, 98]);
        assert_eq!(counter.word_counts(), &[2, 1]);
    }

    #[test]
    fn test_count_pairs_with_frequency() {
        let counter = PairCounter::from_chunks(&["ab", "ab", "ab"]);
        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.get((97, 98)), 3);
    }

    #[test]
    fn test_pairs_do_not_cross_chunks() {
        let counter = PairCounter::from_chunks(&["ab", "ba"]);
        let pairs = counter.count_pairs_sequential();
        assert_eq!(pairs.get((98, 98)), 0);
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_count_pairs_parallel_matches_sequential() {
        let chunks: Vec<String> = (0..200)
            .map(|i| format!("chunk{}-{}", i % 17, "abc".repeat(i % 5)))
            .collect();
        let counter = PairCounter::from_chunks(&chunks);

        assert_eq!(
            counter.count_pairs_parallel(),
            counter.count_pairs_sequential()
        );
    }

    #[test]
    fn test_max_merges_counts_distinct_chunks() {
        let counter = PairCounter::from_chunks(&["abc", "abc", "de", "x"]);
        assert_eq!(counter.max_merges(), 3);
        assert_eq!(PairCounter::new().max_merges(), 0);
    }

    #[test]
    fn test_merge_pair() {
        let mut counter = PairCounter::from_chunks(&["aaab", "aa"]);
        counter.merge_pair((97, 97), 256, true);

        assert_eq!(counter.words()[0].as_slice(), &[256, 97, 98]);
        assert_eq!(counter.words()[1].as_slice(), &[256]);
        assert_eq!(counter.count_pairs(false).get((97, 97)), 0);
    }
}
