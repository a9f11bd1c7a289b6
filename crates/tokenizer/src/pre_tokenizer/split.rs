//! Text splitting for pre-tokenization.
//!
//! The chunker is chosen once at construction: either the whole text is one
//! chunk, or the chunks are the successive matches of a regex. Training and
//! encoding call the same `split`, so both see identical chunks.

use bytepair_core::{Result, TokenizerError};
use fancy_regex::Regex;

/// Splits text into the chunks merges are confined to.
#[derive(Debug, Clone, Default)]
pub enum Chunker {
    /// No splitting (the whole text is one chunk)
    #[default]
    ByteLevel,
    /// Every match of the pattern is a chunk; unmatched text is dropped
    Regex { pattern: String, regex: Regex },
}

impl Chunker {
    /// Create a chunker that keeps text whole.
    pub fn byte_level() -> Self {
        Self::ByteLevel
    }

    /// Compile a split pattern. An empty pattern means no splitting.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::ByteLevel);
        }
        let regex = Regex::new(pattern)
            .map_err(|e| TokenizerError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        Ok(Self::Regex {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern source (empty for byte-level).
    pub fn pattern(&self) -> &str {
        match self {
            Self::ByteLevel => "",
            Self::Regex { pattern, .. } => pattern,
        }
    }

    /// Split text into chunks, in text order. Empty chunks are omitted.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        match self {
            Self::ByteLevel if text.is_empty() => Ok(Vec::new()),
            Self::ByteLevel => Ok(vec![text]),
            Self::Regex { regex, .. } => {
                let mut chunks = Vec::new();
                for m in regex.find_iter(text) {
                    let m = m.map_err(|e| TokenizerError::Chunking(e.to_string()))?;
                    if !m.as_str().is_empty() {
                        chunks.push(m.as_str());
                    }
                }
                Ok(chunks)
            }
        }
    }
}
