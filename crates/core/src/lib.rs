//! Bytepair-core - Core BPE algorithm implementation
//!
//! This crate provides the fundamental data structures and algorithms for
//! byte-pair encoding (BPE): the ordered merge list, the id -> bytes
//! vocabulary, pair statistics, the merge rewrite, and a rank-ordered
//! byte-level encoder.
//!
//! # Features
//!
//! - Merge rank is list position; hash-map order never affects results
//! - Deterministic pair selection (highest count, smallest pair on ties)
//! - Immutable special-token snapshots
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use bytepair_core::{ByteLevelEncoder, MergeList};
//!
//! let merges = MergeList::from_pairs([(104, 105)])?;
//! let encoder = ByteLevelEncoder::new(merges)?;
//! assert_eq!(encoder.encode("hi!"), vec![256, 33]);
//! # Ok::<(), bytepair_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Core BPE algorithm modules
pub mod core;
pub use core::{
    merge, MergeCandidate, MergeList, MergeRule, Pair, PairStats, SpecialTokens, TokenId,
    Vocabulary, BYTE_VOCAB_SIZE,
};

// Encoding
pub mod encoding;
pub use encoding::ByteLevelEncoder;

// Display helpers
pub mod render;
pub use render::render_token;
