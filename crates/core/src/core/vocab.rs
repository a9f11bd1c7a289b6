//! Vocabulary storage and lookup.
//!
//! The vocabulary maps every base byte and every merge-derived id to the
//! byte sequence it stands for. Ids are dense (`0..len`), so a plain vector
//! indexed by id is enough.

use crate::core::merges::{MergeList, Pair, TokenId, BYTE_VOCAB_SIZE};
use crate::error::{Result, TokenizerError};

/// Id -> byte sequence table for base bytes and merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<Vec<u8>>,
}

impl Vocabulary {
    /// The 256 byte identities and nothing else.
    pub fn new() -> Self {
        Self::with_capacity(BYTE_VOCAB_SIZE as usize)
    }

    /// Byte identities with room for `capacity` entries in total.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut tokens = Vec::with_capacity(capacity.max(BYTE_VOCAB_SIZE as usize));
        tokens.extend((0..=u8::MAX).map(|b| vec![b]));
        Self { tokens }
    }

    /// Replay a merge list on top of the byte identities.
    pub fn from_merges(merges: &MergeList) -> Result<Self> {
        let mut vocab = Self::with_capacity(BYTE_VOCAB_SIZE as usize + merges.len());
        for rule in merges.iter() {
            let id = vocab.add_merge(rule.pair)?;
            debug_assert_eq!(id, rule.id);
        }
        Ok(vocab)
    }

    /// Append `vocab[left] ++ vocab[right]` and return its id.
    pub fn add_merge(&mut self, pair: Pair) -> Result<TokenId> {
        let (left, right) = match (self.get(pair.0), self.get(pair.1)) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(TokenizerError::InvalidMerge(format!(
                    "pair ({}, {}) references an unknown id",
                    pair.0, pair.1
                )))
            }
        };

        let mut merged = Vec::with_capacity(left.len() + right.len());
        merged.extend_from_slice(left);
        merged.extend_from_slice(right);

        let id = self.tokens.len() as TokenId;
        self.tokens.push(merged);
        Ok(id)
    }

    /// Get the bytes for an ID.
    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&[u8]> {
        self.tokens.get(id as usize).map(Vec::as_slice)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as TokenId, bytes.as_slice()))
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: the byte identities are never removed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_identities() {
        let vocab = Vocabulary::new();
        assert_eq!(vocab.len(), 256);
        for (id, bytes) in vocab.iter() {
            assert_eq!(bytes, &[id as u8]);
        }
        assert_eq!(vocab.get(256), None);
    }

    #[test]
    fn test_merge_concatenates_parents() {
        let merges = MergeList::from_pairs(vec![(104, 105), (256, 33)]).unwrap();
        let vocab = Vocabulary::from_merges(&merges).unwrap();

        assert_eq!(vocab.get(256), Some(&b"hi"[..]));
        assert_eq!(vocab.get(257), Some(&b"hi!"[..]));

        for rule in merges.iter() {
            let mut expected = vocab.get(rule.pair.0).unwrap().to_vec();
            expected.extend_from_slice(vocab.get(rule.pair.1).unwrap());
            assert_eq!(vocab.get(rule.id).unwrap(), expected.as_slice());
        }
    }

    #[test]
    fn test_unknown_parent() {
        let mut vocab = Vocabulary::new();
        assert!(matches!(
            vocab.add_merge((300, 1)),
            Err(TokenizerError::InvalidMerge(_))
        ));
    }
}
