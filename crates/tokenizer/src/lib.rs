//! Bytepair-tokenizer - High-level tokenizer API
//!
//! This crate puts the core BPE pieces behind one `Tokenizer`: training on
//! raw text, encoding with a special-token policy, decoding, and the
//! `minbpe v1` model file.
//!
//! # Features
//!
//! - Byte-level or regex-chunked variants, picked at construction
//! - Special tokens with `all` / `none` / `none_raise` / subset policies
//! - Atomic special-token registration, safe alongside concurrent encodes
//! - Parallel batch encoding
//!
//! # Example
//!
//! ```rust
//! use bytepair_tokenizer::{AllowedSpecial, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::byte_level();
//! tokenizer.train("aaabdaaabac", 259, false)?;
//! tokenizer.register_special_tokens([("<|endoftext|>", 500)])?;
//!
//! let ids = tokenizer.encode("aaab<|endoftext|>", &AllowedSpecial::All)?;
//! assert_eq!(ids, vec![258, 500]);
//! assert_eq!(tokenizer.decode(&ids)?, "aaab<|endoftext|>");
//! # Ok::<(), bytepair_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use bytepair_core::{MergeList, Result, SpecialTokens, TokenId, TokenizerError, Vocabulary};
pub use bytepair_training::{CancellationToken, TrainingConfig};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFile, TokenizerLoader, TokenizerSaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{AllowedSpecial, Chunker, Span, SpecialTokenPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
