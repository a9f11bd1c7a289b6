//! Load functionality for saved tokenizers.

use super::format::ModelFile;
use bytepair_core::{Result, TokenizerError};
use log::info;
use std::path::Path;

/// Tokenizer loader - reads and validates a model file.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Read a `.model` file.
    ///
    /// Nothing is returned unless the whole file parses, so callers can swap
    /// the result in without ever exposing a half-loaded model.
    pub fn load(path: &Path) -> Result<ModelFile> {
        let content = std::fs::read_to_string(path).map_err(|e| TokenizerError::io(path, e))?;
        let model = ModelFile::parse(&content)?;

        info!(
            "Loaded {} merges and {} special tokens from {}",
            model.merges.len(),
            model.special.len(),
            path.display()
        );
        Ok(model)
    }
}
