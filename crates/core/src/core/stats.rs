//! Pair statistics and the merge rewrite.
//!
//! `PairStats` only observes: it counts every overlapping window of length
//! two. `merge` is the single rewrite primitive shared by training and
//! encoding.

use crate::core::merges::{Pair, TokenId};
use ahash::AHashMap;
use std::cmp::Ordering;

/// A candidate pair and how often it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token IDs to merge
    pub pair: Pair,
    /// The frequency/count of this pair
    pub count: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }
}

// Higher count wins; on equal counts the lexicographically smaller pair wins.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Adjacent pair counts over one or more id sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairStats {
    counts: AHashMap<Pair, u64>,
}

impl PairStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count pairs of a single sequence.
    pub fn from_ids(ids: &[TokenId]) -> Self {
        let mut stats = Self::new();
        stats.add_ids(ids);
        stats
    }

    /// Add every adjacent pair of `ids` once.
    #[inline]
    pub fn add_ids(&mut self, ids: &[TokenId]) {
        self.add_ids_weighted(ids, 1);
    }

    /// Add every adjacent pair of `ids` with the given multiplicity.
    pub fn add_ids_weighted(&mut self, ids: &[TokenId], weight: u64) {
        for window in ids.windows(2) {
            *self.counts.entry((window[0], window[1])).or_insert(0) += weight;
        }
    }

    /// Fold another set of counts into this one.
    pub fn merge_from(&mut self, other: PairStats) {
        if self.counts.is_empty() {
            self.counts = other.counts;
            return;
        }
        for (pair, count) in other.counts {
            *self.counts.entry(pair).or_insert(0) += count;
        }
    }

    /// Count for a pair (zero when absent).
    #[inline]
    pub fn get(&self, pair: Pair) -> u64 {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    /// The pair with the highest count, smallest pair on ties.
    pub fn most_frequent(&self) -> Option<MergeCandidate> {
        self.counts
            .iter()
            .map(|(&pair, &count)| MergeCandidate::new(pair, count))
            .max()
    }

    /// Iterate over `(pair, count)` entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, u64)> + '_ {
        self.counts.iter().map(|(&pair, &count)| (pair, count))
    }

    /// Number of distinct pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether no pair was seen.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Replace every non-overlapping occurrence of `pair`, scanning left to right.
///
/// `[a, a, a]` with pair `(a, a)` yields `[new, a]`.
pub fn merge(ids: &[TokenId], pair: Pair, new_id: TokenId) -> Vec<TokenId> {
    let n = ids.len();
    let mut out = Vec::with_capacity(n);

    let mut i = 0;
    while i < n {
        if i + 1 < n && ids[i] == pair.0 && ids[i + 1] == pair.1 {
            out.push(new_id);
            i += 2;
        } else {
            out.push(ids[i]);
            i += 1;
        }
    }

    out
}
