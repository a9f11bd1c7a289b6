//! Main tokenizer implementation.
//!
//! `Tokenizer` ties a chunker, the rank-ordered encoder and the special-token
//! registry together. Merge tables are shared read-only behind `Arc`s once
//! trained or loaded; the special-token registry is an immutable snapshot
//! swapped wholesale on registration, so encode and decode can run from many
//! threads while registration happens.

use crate::io::{ModelFile, TokenizerLoader, TokenizerSaver};
use crate::pre_tokenizer::{AllowedSpecial, Chunker, Span, SpecialTokenPolicy};
use bytepair_core::{
    ByteLevelEncoder, MergeList, Result, SpecialTokens, TokenId, TokenizerError, Vocabulary,
    BYTE_VOCAB_SIZE,
};
use bytepair_training::{BpeTrainer, CancellationToken, TrainingConfig};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    /// Chunk split pattern; `None` keeps the whole text as one chunk
    pub pattern: Option<String>,
    /// Special tokens registered at construction
    pub special_tokens: Vec<(String, TokenId)>,
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split text into chunks with a regex pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = Some(pattern.into());
        self
    }

    /// Treat the whole text as one chunk (the default).
    pub fn byte_level(mut self) -> Self {
        self.config.pattern = None;
        self
    }

    /// Register one special token.
    pub fn special_token(mut self, literal: impl Into<String>, id: TokenId) -> Self {
        self.config.special_tokens.push((literal.into(), id));
        self
    }

    /// Register several special tokens.
    pub fn special_tokens<S: Into<String>>(
        mut self,
        tokens: impl IntoIterator<Item = (S, TokenId)>,
    ) -> Self {
        self.config
            .special_tokens
            .extend(tokens.into_iter().map(|(s, id)| (s.into(), id)));
        self
    }

    /// Build the tokenizer, compiling the pattern.
    pub fn build(self) -> Result<Tokenizer> {
        Tokenizer::new(self.config)
    }
}

/// Main tokenizer struct.
#[derive(Debug)]
pub struct Tokenizer {
    /// Text splitter
    chunker: Chunker,
    /// Rank-ordered merge encoder with shared tables
    encoder: ByteLevelEncoder,
    /// Current special-token snapshot
    special: RwLock<Arc<SpecialTokens>>,
}

impl Tokenizer {
    /// Create an untrained tokenizer from a configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        let chunker = match config.pattern.as_deref() {
            Some(pattern) => Chunker::from_pattern(pattern)?,
            None => Chunker::byte_level(),
        };
        let special = SpecialTokens::from_entries(config.special_tokens)?;

        Ok(Self::from_parts(chunker, ByteLevelEncoder::default(), special))
    }

    /// Untrained tokenizer that never splits its input.
    pub fn byte_level() -> Self {
        Self::from_parts(
            Chunker::byte_level(),
            ByteLevelEncoder::default(),
            SpecialTokens::new(),
        )
    }

    /// Untrained tokenizer that splits on `pattern`.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Self::builder().pattern(pattern).build()
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    fn from_parts(chunker: Chunker, encoder: ByteLevelEncoder, special: SpecialTokens) -> Self {
        Self {
            chunker,
            encoder,
            special: RwLock::new(Arc::new(special)),
        }
    }

    /// Build a tokenizer from a parsed model file.
    pub fn from_model_file(model: ModelFile) -> Result<Self> {
        let chunker = Chunker::from_pattern(&model.pattern)?;
        let encoder = ByteLevelEncoder::new(model.merges)?;
        warn_on_overlap(&model.special, encoder.merges());

        Ok(Self::from_parts(chunker, encoder, model.special))
    }

    /// Train on `text`, replacing any previously learned merges.
    ///
    /// Returns the learned merges and the vocabulary derived from them.
    pub fn train(
        &mut self,
        text: &str,
        vocab_size: usize,
        verbose: bool,
    ) -> Result<(Arc<MergeList>, Arc<Vocabulary>)> {
        let config = TrainingConfig {
            vocab_size,
            verbose,
            ..Default::default()
        };
        self.train_with(text, config, None)
    }

    /// Train with a full configuration and an optional cancellation token.
    ///
    /// On any error, including cancellation, the tokenizer is left as it was.
    pub fn train_with(
        &mut self,
        text: &str,
        config: TrainingConfig,
        cancel: Option<CancellationToken>,
    ) -> Result<(Arc<MergeList>, Arc<Vocabulary>)> {
        let chunks = self.chunker.split(text)?;

        let mut trainer = BpeTrainer::new(config);
        if let Some(token) = cancel {
            trainer = trainer.with_cancellation(token);
        }
        let model = trainer.train(&chunks)?;

        let merges = Arc::new(model.merges);
        let vocab = Arc::new(model.vocab);
        self.encoder = ByteLevelEncoder::with_arcs(Arc::clone(&merges), Arc::clone(&vocab));
        warn_on_overlap(&self.special_tokens(), &merges);

        Ok((merges, vocab))
    }

    /// Replace every registered special token with `tokens`.
    ///
    /// Encode and decode calls running concurrently see either the old or
    /// the new registry, never a mix.
    pub fn register_special_tokens<S, I>(&self, tokens: I) -> Result<()>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, TokenId)>,
    {
        let snapshot = SpecialTokens::from_entries(tokens)?;
        warn_on_overlap(&snapshot, self.encoder.merges());

        let mut guard = self.special.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(snapshot);
        Ok(())
    }

    /// Current special-token snapshot.
    pub fn special_tokens(&self) -> Arc<SpecialTokens> {
        let guard = self.special.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Encode text, ignoring special tokens entirely.
    pub fn encode_ordinary(&self, text: &str) -> Result<Vec<TokenId>> {
        let mut ids = Vec::with_capacity(text.len());
        self.encode_ordinary_into(text, &mut ids)?;
        Ok(ids)
    }

    fn encode_ordinary_into(&self, text: &str, ids: &mut Vec<TokenId>) -> Result<()> {
        for chunk in self.chunker.split(text)? {
            ids.extend(self.encoder.encode(chunk));
        }
        Ok(())
    }

    /// Encode text, emitting allowed special tokens as their ids.
    ///
    /// # Errors
    /// `DisallowedSpecialToken` under `AllowedSpecial::NoneRaise` when the
    /// text contains a registered literal.
    pub fn encode(&self, text: &str, allowed: &AllowedSpecial) -> Result<Vec<TokenId>> {
        let special = self.special_tokens();
        let policy = SpecialTokenPolicy::new(&special, allowed);

        let mut ids = Vec::with_capacity(text.len());
        for span in policy.split(text)? {
            match span {
                Span::Ordinary(s) => self.encode_ordinary_into(s, &mut ids)?,
                Span::Special(id) => ids.push(id),
            }
        }
        Ok(ids)
    }

    /// `encode` with the policy given by name: `all`, `none` or `none_raise`.
    pub fn encode_with_policy(&self, text: &str, policy: &str) -> Result<Vec<TokenId>> {
        let allowed: AllowedSpecial = policy.parse()?;
        self.encode(text, &allowed)
    }

    /// Encode independent texts in parallel. Results keep input order.
    pub fn encode_batch<S>(&self, texts: &[S], allowed: &AllowedSpecial) -> Result<Vec<Vec<TokenId>>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.encode(text.as_ref(), allowed))
            .collect()
    }

    /// Concatenated bytes for `ids`.
    pub fn decode_bytes(&self, ids: &[TokenId]) -> Result<Vec<u8>> {
        let special = self.special_tokens();
        let mut bytes = Vec::with_capacity(ids.len() * 2);

        for &id in ids {
            if let Some(token) = self.encoder.token_bytes(id) {
                bytes.extend_from_slice(token);
            } else if let Some(literal) = special.literal(id) {
                bytes.extend_from_slice(literal.as_bytes());
            } else {
                return Err(TokenizerError::UnknownTokenId(id));
            }
        }
        Ok(bytes)
    }

    /// Decode ids to text. Invalid UTF-8 becomes U+FFFD.
    pub fn decode(&self, ids: &[TokenId]) -> Result<String> {
        let bytes = self.decode_bytes(ids)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Learned merges in rank order.
    pub fn merges(&self) -> &MergeList {
        self.encoder.merges()
    }

    /// Byte and merge-derived tokens.
    pub fn vocab(&self) -> &Vocabulary {
        self.encoder.vocab()
    }

    /// Chunk pattern, empty for byte-level tokenizers.
    pub fn pattern(&self) -> &str {
        self.chunker.pattern()
    }

    /// Number of ids this tokenizer can produce, special tokens included.
    pub fn vocab_size(&self) -> usize {
        self.vocab().len() + self.special_tokens().len()
    }

    /// Save to `<prefix>.model` and `<prefix>.vocab`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<PathBuf> {
        let special = self.special_tokens();
        TokenizerSaver::new(self.pattern(), self.merges(), self.vocab(), &special)
            .save(prefix.as_ref())
    }

    /// Load a tokenizer from a `.model` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_model_file(TokenizerLoader::load(path.as_ref())?)
    }

    /// Replace this tokenizer's state with a `.model` file.
    ///
    /// The file is fully parsed before anything is replaced; on error the
    /// tokenizer keeps its previous state.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let fresh = Self::load(path.as_ref())?;
        *self = fresh;
        info!("Reloaded tokenizer from {}", path.as_ref().display());
        Ok(())
    }
}

impl Clone for Tokenizer {
    fn clone(&self) -> Self {
        Self {
            chunker: self.chunker.clone(),
            encoder: self.encoder.clone(),
            special: RwLock::new(self.special_tokens()),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::byte_level()
    }
}

/// Special ids should stay clear of byte and merge ids; only warn, since
/// callers may overlap them on purpose.
fn warn_on_overlap(special: &SpecialTokens, merges: &MergeList) {
    for (literal, id) in special.iter() {
        if id < BYTE_VOCAB_SIZE || merges.is_merge_id(id) {
            warn!(
                "special token {:?} uses id {}, which is also a byte or merge id",
                literal, id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Tokenizer {
        let mut tokenizer = Tokenizer::byte_level();
        tokenizer.train("aaabdaaabac", 259, false).unwrap();
        tokenizer
    }

    #[test]
    fn test_builder() {
        let tokenizer = Tokenizer::builder()
            .pattern(r"\w+|\s+")
            .special_token("<|eot|>", 300)
            .build()
            .unwrap();

        assert_eq!(tokenizer.pattern(), r"\w+|\s+");
        assert_eq!(tokenizer.vocab_size(), 257);
        assert_eq!(tokenizer.special_tokens().id("<|eot|>"), Some(300));
    }

    #[test]
    fn test_builder_rejects_bad_pattern() {
        let err = Tokenizer::builder().pattern("(").build().unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidPattern(_)));
    }

    #[test]
    fn test_train_and_encode() {
        let tokenizer = scenario();
        assert_eq!(tokenizer.merges().len(), 3);
        assert_eq!(
            tokenizer.encode_ordinary("aaabdaaabac").unwrap(),
            vec![258, 100, 258, 97, 99]
        );
        assert_eq!(tokenizer.decode(&[258, 100]).unwrap(), "aaabd");
    }

    #[test]
    fn test_failed_training_keeps_state() {
        let mut tokenizer = scenario();
        let err = tokenizer.train("hello", 100, false).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidVocabSize(100)));

        let token = CancellationToken::new();
        token.cancel();
        let config = TrainingConfig {
            vocab_size: 300,
            ..Default::default()
        };
        assert!(tokenizer.train_with("hello", config, Some(token)).is_err());
        assert_eq!(tokenizer.merges().len(), 3);
    }

    #[test]
    fn test_regex_chunks_limit_merges() {
        let mut tokenizer = Tokenizer::with_pattern(r" ?\w+").unwrap();
        tokenizer.train("ab ab ab", 1000, false).unwrap();

        // no merge may span the space that starts a chunk
        for &(left, right) in tokenizer.merges().pairs() {
            let right_bytes = tokenizer.vocab().get(right).unwrap();
            assert_ne!(right_bytes.first(), Some(&b' '), "{:?}", (left, right));
        }
    }

    #[test]
    fn test_encode_policies() {
        let tokenizer = scenario();
        tokenizer
            .register_special_tokens([("<|endoftext|>", 500)])
            .unwrap();
        let text = "aa<|endoftext|>ab";

        assert!(matches!(
            tokenizer.encode(text, &AllowedSpecial::NoneRaise),
            Err(TokenizerError::DisallowedSpecialToken(_))
        ));
        assert_eq!(
            tokenizer.encode(text, &AllowedSpecial::All).unwrap(),
            vec![256, 500, 257]
        );
        let ordinary = tokenizer.encode(text, &AllowedSpecial::None).unwrap();
        assert_eq!(ordinary, tokenizer.encode_ordinary(text).unwrap());
        assert!(matches!(
            tokenizer.encode_with_policy(text, "sometimes"),
            Err(TokenizerError::UnknownAllowedSpecialPolicy(_))
        ));
    }

    #[test]
    fn test_registration_replaces_snapshot() {
        let tokenizer = Tokenizer::byte_level();
        tokenizer.register_special_tokens([("<a>", 300)]).unwrap();
        let before = tokenizer.special_tokens();

        tokenizer.register_special_tokens([("<b>", 301)]).unwrap();
        assert_eq!(before.id("<a>"), Some(300));
        assert_eq!(tokenizer.special_tokens().id("<a>"), None);
        assert_eq!(tokenizer.decode(&[301]).unwrap(), "<b>");

        assert!(tokenizer
            .register_special_tokens([("<c>", 302), ("<c>", 303)])
            .is_err());
        assert_eq!(tokenizer.special_tokens().id("<b>"), Some(301));
    }

    #[test]
    fn test_decode_errors_and_lossy() {
        let tokenizer = Tokenizer::byte_level();
        assert!(matches!(
            tokenizer.decode(&[256]),
            Err(TokenizerError::UnknownTokenId(256))
        ));
        assert_eq!(tokenizer.decode(&[0xff, 104]).unwrap(), "\u{fffd}h");
        assert_eq!(tokenizer.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_encode_batch_keeps_order() {
        let tokenizer = scenario();
        let texts = ["aaab", "", "ac"];
        let out = tokenizer.encode_batch(&texts, &AllowedSpecial::All).unwrap();
        assert_eq!(out, vec![vec![258], vec![], vec![97, 99]]);
    }

    #[test]
    fn test_clone_is_independent() {
        let tokenizer = scenario();
        let copy = tokenizer.clone();
        tokenizer.register_special_tokens([("<x>", 400)]).unwrap();

        assert!(copy.special_tokens().is_empty());
        assert_eq!(copy.merges(), tokenizer.merges());
    }
}
