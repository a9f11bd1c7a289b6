//! Core BPE data structures.
//!
//! This module contains the ordered merge list, the byte vocabulary, pair
//! statistics with the merge rewrite, and the special-token registry.

pub mod merges;
pub mod special;
pub mod stats;
pub mod vocab;

pub use merges::{MergeList, MergeRule, Pair, TokenId, BYTE_VOCAB_SIZE};
pub use special::SpecialTokens;
pub use stats::{merge, MergeCandidate, PairStats};
pub use vocab::Vocabulary;
