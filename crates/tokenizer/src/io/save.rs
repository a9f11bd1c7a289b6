//! Save functionality for trained tokenizers.
//!
//! `save(prefix)` writes two files next to each other: `<prefix>.model`,
//! which `TokenizerLoader` reads back, and `<prefix>.vocab`, a dump for
//! people to inspect.

use super::format::{write_model, write_vocab_dump, MODEL_EXTENSION, VOCAB_EXTENSION};
use bytepair_core::{MergeList, Result, SpecialTokens, TokenizerError, Vocabulary};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Tokenizer saver - borrows the tables of one tokenizer.
pub struct TokenizerSaver<'a> {
    /// Split pattern, empty for byte-level
    pattern: &'a str,
    /// Merge rules in rank order
    merges: &'a MergeList,
    /// Vocabulary derived from `merges`
    vocab: &'a Vocabulary,
    /// Special-token snapshot
    special: &'a SpecialTokens,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new tokenizer saver.
    pub fn new(
        pattern: &'a str,
        merges: &'a MergeList,
        vocab: &'a Vocabulary,
        special: &'a SpecialTokens,
    ) -> Self {
        Self {
            pattern,
            merges,
            vocab,
            special,
        }
    }

    /// Write `<prefix>.model` and `<prefix>.vocab`.
    ///
    /// Missing parent directories are created. Returns the model file path.
    pub fn save(&self, prefix: &Path) -> Result<PathBuf> {
        if self.pattern.contains(['\n', '\r']) {
            return Err(TokenizerError::InvalidPattern(
                "pattern with a line break cannot be saved".to_string(),
            ));
        }

        if let Some(parent) = prefix.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }

        let model_path = with_extension(prefix, MODEL_EXTENSION);
        Self::write_file(&model_path, |w| {
            write_model(w, self.pattern, self.special, self.merges)
        })?;

        let vocab_path = with_extension(prefix, VOCAB_EXTENSION);
        Self::write_file(&vocab_path, |w| {
            write_vocab_dump(w, self.merges, self.vocab, self.special)
        })?;

        info!(
            "Saved tokenizer to {} and {}",
            model_path.display(),
            vocab_path.display()
        );
        Ok(model_path)
    }

    fn write_file<F>(path: &Path, body: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        let file = File::create(path).map_err(|e| TokenizerError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        body(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| TokenizerError::io(path, e))
    }
}

/// Append `.ext` to the prefix, keeping any dots already in its file name.
fn with_extension(prefix: &Path, ext: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
