//! Error types for the bytepair tokenizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Requested vocabulary is smaller than the 256 byte identities
    #[error("Vocabulary size must be at least 256, got {0}")]
    InvalidVocabSize(usize),

    /// Model file does not start with the expected version tag
    #[error("Unsupported model version: {0:?}")]
    UnsupportedModelVersion(String),

    /// Model file is structurally invalid
    #[error("Malformed model file at line {line}: {reason}")]
    MalformedModelFile { line: usize, reason: String },

    /// Input contains a special token while the policy forbids it
    #[error("Disallowed special token found in text: {0:?}")]
    DisallowedSpecialToken(String),

    /// Allowed-special policy value was not understood
    #[error("allowed_special={0:?} not understood")]
    UnknownAllowedSpecialPolicy(String),

    /// Unknown token ID
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Split pattern failed to compile
    #[error("Invalid split pattern: {0}")]
    InvalidPattern(String),

    /// Split pattern failed while matching input
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// Special-token registration rejected
    #[error("Invalid special token: {0}")]
    InvalidSpecialToken(String),

    /// Invalid merge rule
    #[error("Invalid merge rule: {0}")]
    InvalidMerge(String),

    /// Training stopped by cancellation or timeout
    #[error("Training cancelled after {completed} merges")]
    TrainingCancelled { completed: usize },

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}

impl TokenizerError {
    /// Shorthand for a structural failure at a 1-based line number.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedModelFile {
            line,
            reason: reason.into(),
        }
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
