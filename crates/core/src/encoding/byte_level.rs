//! Byte-level BPE encoding.
//!
//! A chunk starts as its raw UTF-8 bytes. On every round the adjacent pair
//! with the lowest merge rank is merged everywhere in the chunk; encoding
//! stops when no adjacent pair has a rank. Because merge ids grow in learned
//! order, this replays training's merge order exactly.

use crate::core::{merge, MergeList, TokenId, Vocabulary, BYTE_VOCAB_SIZE};
use std::sync::Arc;

/// Rank-ordered merge encoder over shared, read-only model tables.
#[derive(Debug, Clone)]
pub struct ByteLevelEncoder {
    /// Merge rules in rank order
    merges: Arc<MergeList>,
    /// id -> bytes for bytes and merges
    vocab: Arc<Vocabulary>,
}

impl ByteLevelEncoder {
    /// Build an encoder, deriving the vocabulary from the merges.
    pub fn new(merges: MergeList) -> crate::Result<Self> {
        let vocab = Vocabulary::from_merges(&merges)?;
        Ok(Self::with_arcs(Arc::new(merges), Arc::new(vocab)))
    }

    /// Build an encoder over tables that are already shared.
    ///
    /// `vocab` must be the vocabulary derived from `merges`.
    pub fn with_arcs(merges: Arc<MergeList>, vocab: Arc<Vocabulary>) -> Self {
        debug_assert_eq!(vocab.len(), BYTE_VOCAB_SIZE as usize + merges.len());
        Self { merges, vocab }
    }

    /// Encode one chunk of bytes.
    pub fn encode_chunk(&self, bytes: &[u8]) -> Vec<TokenId> {
        let mut ids: Vec<TokenId> = bytes.iter().map(|&b| TokenId::from(b)).collect();

        while ids.len() >= 2 {
            // min_by_key keeps the leftmost of equal ranks
            let best = ids
                .windows(2)
                .filter_map(|w| {
                    let pair = (w[0], w[1]);
                    self.merges.rank(pair).map(|rank| (rank, pair))
                })
                .min_by_key(|&(rank, _)| rank);

            let Some((rank, pair)) = best else {
                break;
            };
            ids = merge(&ids, pair, BYTE_VOCAB_SIZE + rank);
        }

        ids
    }

    /// Encode a string as a single chunk.
    #[inline]
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.encode_chunk(text.as_bytes())
    }

    /// Bytes for a base or merge-derived id.
    #[inline]
    pub fn token_bytes(&self, id: TokenId) -> Option<&[u8]> {
        self.vocab.get(id)
    }

    /// Shared merge list.
    pub fn merges(&self) -> &Arc<MergeList> {
        &self.merges
    }

    /// Shared vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }
}

impl Default for ByteLevelEncoder {
    fn default() -> Self {
        Self::with_arcs(Arc::new(MergeList::new()), Arc::new(Vocabulary::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(pairs: Vec<(u32, u32)>) -> ByteLevelEncoder {
        ByteLevelEncoder::new(MergeList::from_pairs(pairs).unwrap()).unwrap()
    }

    #[test]
    fn test_no_merges_is_identity() {
        let encoder = ByteLevelEncoder::default();
        assert_eq!(encoder.encode("hi!"), vec![104, 105, 33]);
        assert!(encoder.encode("").is_empty());
    }

    #[test]
    fn test_replays_merge_order() {
        // a=97 b=98 c=99 d=100
        let encoder = encoder(vec![(97, 97), (97, 98), (256, 257)]);
        assert_eq!(encoder.encode("aaabdaaabac"), vec![258, 100, 258, 97, 99]);
    }

    #[test]
    fn test_lowest_rank_wins_over_position() {
        // (98, 99) was learned first, so "abc" becomes [a, bc] not [ab, c]
        let encoder = encoder(vec![(98, 99), (97, 98)]);
        assert_eq!(encoder.encode("abc"), vec![97, 256]);
    }

    #[test]
    fn test_multibyte_chunk() {
        let bytes = "é".as_bytes();
        let encoder = encoder(vec![(u32::from(bytes[0]), u32::from(bytes[1]))]);
        assert_eq!(encoder.encode("éé"), vec![256, 256]);
        assert_eq!(encoder.token_bytes(256), Some(bytes));
    }
}
