//! Ordered merge rule storage.
//!
//! Merge rules are kept in an explicit list: the position of a rule is its
//! rank, and the token it produces is always `256 + rank`. A side index maps
//! pairs back to ranks for fast lookups during encoding. Hash-map iteration
//! order never decides anything here.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Token identifier. Ids `0..256` are raw bytes.
pub type TokenId = u32;

/// A pair of token IDs that can be merged.
pub type Pair = (TokenId, TokenId);

/// Number of base byte identities.
pub const BYTE_VOCAB_SIZE: u32 = 256;

/// A single learned merge: `pair` is replaced by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    pub pair: Pair,
    pub id: TokenId,
}

impl MergeRule {
    /// Priority of this rule (lower merges first).
    #[inline]
    pub fn rank(&self) -> u32 {
        self.id - BYTE_VOCAB_SIZE
    }
}

/// Ordered collection of merge rules with rank lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeList {
    /// Pairs in learned order; index is the rank
    pairs: Vec<Pair>,
    /// pair -> rank
    ranks: AHashMap<Pair, u32>,
}

impl MergeList {
    /// Create a new empty merge list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new merge list with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
            ranks: AHashMap::with_capacity(capacity),
        }
    }

    /// Build a merge list whose ranks come purely from iteration order.
    ///
    /// The k-th pair receives id `256 + k`. Fails if a pair repeats or refers
    /// to an id that is not defined yet at its position.
    pub fn from_pairs(pairs: impl IntoIterator<Item = Pair>) -> Result<Self> {
        let pairs = pairs.into_iter();
        let mut list = Self::with_capacity(pairs.size_hint().0);
        for pair in pairs {
            list.push(pair)?;
        }
        Ok(list)
    }

    /// Append a rule and return the id assigned to it.
    pub fn push(&mut self, pair: Pair) -> Result<TokenId> {
        let next = self.next_id();
        if pair.0 >= next || pair.1 >= next {
            return Err(TokenizerError::InvalidMerge(format!(
                "pair ({}, {}) references an id not defined before {}",
                pair.0, pair.1, next
            )));
        }
        if self.ranks.contains_key(&pair) {
            return Err(TokenizerError::InvalidMerge(format!(
                "pair ({}, {}) is already merged",
                pair.0, pair.1
            )));
        }

        let rank = self.pairs.len() as u32;
        self.pairs.push(pair);
        self.ranks.insert(pair, rank);
        Ok(next)
    }

    /// Id the next pushed rule will receive.
    #[inline]
    pub fn next_id(&self) -> TokenId {
        BYTE_VOCAB_SIZE + self.pairs.len() as u32
    }

    /// Rank of a pair, if it was learned.
    #[inline]
    pub fn rank(&self, pair: Pair) -> Option<u32> {
        self.ranks.get(&pair).copied()
    }

    /// Id produced by merging a pair, if it was learned.
    #[inline]
    pub fn merged_id(&self, pair: Pair) -> Option<TokenId> {
        self.rank(pair).map(|rank| BYTE_VOCAB_SIZE + rank)
    }

    /// The pair a merge-derived id was built from.
    #[inline]
    pub fn parents(&self, id: TokenId) -> Option<Pair> {
        let rank = id.checked_sub(BYTE_VOCAB_SIZE)?;
        self.pairs.get(rank as usize).copied()
    }

    /// Whether `id` was produced by a merge.
    #[inline]
    pub fn is_merge_id(&self, id: TokenId) -> bool {
        id >= BYTE_VOCAB_SIZE && id < self.next_id()
    }

    /// Pairs in rank order.
    #[inline]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Rules in rank order.
    pub fn iter(&self) -> impl Iterator<Item = MergeRule> + '_ {
        self.pairs.iter().enumerate().map(|(rank, &pair)| MergeRule {
            pair,
            id: BYTE_VOCAB_SIZE + rank as u32,
        })
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PartialEq for MergeList {
    fn eq(&self, other: &Self) -> bool {
        self.pairs == other.pairs
    }
}

impl Eq for MergeList {}
