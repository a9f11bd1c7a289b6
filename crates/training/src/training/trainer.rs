//! BPE trainer implementation.
//!
//! Every merge step recounts pairs across all chunks, picks the most frequent
//! pair (smallest pair on equal counts), assigns it the next id and rewrites
//! the chunks. Steps run strictly one after another; only the counting and
//! the rewrite inside a step fan out across threads.

use super::counter::PairCounter;
use bytepair_core::{render_token, MergeList, Result, TokenizerError, Vocabulary, BYTE_VOCAB_SIZE};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target vocabulary size (256 byte ids plus merges)
    pub vocab_size: usize,
    /// Log every merge at info level
    pub verbose: bool,
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Give up after this long, checked between merge steps
    pub timeout: Option<Duration>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 512,
            verbose: false,
            parallel: true,
            timeout: None,
        }
    }
}

/// Cooperative cancellation flag shared between a trainer and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the training loop to stop before its next merge step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Result of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    /// Merge rules in learned order
    pub merges: MergeList,
    /// Byte identities plus one entry per merge
    pub vocab: Vocabulary,
}

/// BPE trainer.
///
/// Learns merge rules from pre-split chunks by iteratively merging the most
/// frequent adjacent pair.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Optional external stop signal
    cancel: Option<CancellationToken>,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on chunks that were already split from the corpus.
    ///
    /// Merges never span two chunks. Fewer merges than requested are learned
    /// when no adjacent pair is left.
    ///
    /// # Errors
    /// `InvalidVocabSize` when the target is below 256, `TrainingCancelled`
    /// when the token fires or the timeout elapses.
    pub fn train<S: AsRef<[u8]>>(&self, chunks: &[S]) -> Result<TrainedModel> {
        let vocab_size = self.config.vocab_size;
        if vocab_size < BYTE_VOCAB_SIZE as usize {
            return Err(TokenizerError::InvalidVocabSize(vocab_size));
        }
        let num_merges = vocab_size - BYTE_VOCAB_SIZE as usize;

        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| started + t);
        let parallel = self.config.parallel;

        let mut counter = PairCounter::from_chunks(chunks);
        info!(
            "Starting BPE training: {} merges over {} chunks ({} distinct)",
            num_merges,
            chunks.len(),
            counter.word_count()
        );

        // every merge shortens some distinct chunk by at least one id
        let reachable = counter.max_merges().min(num_merges);
        let mut merges = MergeList::with_capacity(reachable);
        let mut vocab = Vocabulary::with_capacity(BYTE_VOCAB_SIZE as usize + reachable);

        for i in 0..num_merges {
            self.check_cancelled(i, deadline)?;

            let stats = counter.count_pairs(parallel);
            let Some(best) = stats.most_frequent() else {
                info!("No more pairs to merge after {} merges", i);
                break;
            };

            let new_id = merges.push(best.pair)?;
            vocab.add_merge(best.pair)?;
            counter.merge_pair(best.pair, new_id, parallel);

            let rendered = vocab.get(new_id).map(render_token).unwrap_or_default();
            if self.config.verbose {
                info!(
                    "merge {}/{}: {:?} -> {} ({}) had {} occurrences",
                    i + 1,
                    num_merges,
                    best.pair,
                    new_id,
                    rendered,
                    best.count
                );
            } else {
                trace!(
                    "merge {}: {:?} -> {} ({}) x{}",
                    i + 1,
                    best.pair,
                    new_id,
                    rendered,
                    best.count
                );
            }
        }

        info!(
            "Finished training: {} merges in {:.2?}",
            merges.len(),
            started.elapsed()
        );

        Ok(TrainedModel { merges, vocab })
    }

    fn check_cancelled(&self, completed: usize, deadline: Option<Instant>) -> Result<()> {
        let cancelled = self.cancel.as_ref().is_some_and(|c| c.is_cancelled());
        let expired = deadline.is_some_and(|d| Instant::now() >= d);
        if cancelled || expired {
            info!(
                "Training stopped after {} merges ({})",
                completed,
                if cancelled { "cancelled" } else { "timed out" }
            );
            return Err(TokenizerError::TrainingCancelled { completed });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer(vocab_size: usize, parallel: bool) -> BpeTrainer {
        BpeTrainer::new(TrainingConfig {
            vocab_size,
            parallel,
            ..Default::default()
        })
    }

    #[test]
    fn test_scenario_merge_order() {
        let model = trainer(259, false).train(&["aaabdaaabac"]).unwrap();

        let rules: Vec<_> = model.merges.iter().map(|r| (r.pair, r.id)).collect();
        assert_eq!(
            rules,
            vec![((97, 97), 256), ((97, 98), 257), ((256, 257), 258)]
        );
        assert_eq!(model.vocab.get(256), Some(&b"aa"[..]));
        assert_eq!(model.vocab.get(257), Some(&b"ab"[..]));
        assert_eq!(model.vocab.get(258), Some(&b"aaab"[..]));
        assert_eq!(model.vocab.len(), 259);
    }

    #[test]
    fn test_invalid_vocab_size() {
        let err = trainer(255, false).train(&["hello"]).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidVocabSize(255)));
    }

    #[test]
    fn test_byte_only_vocab() {
        let model = trainer(256, false).train(&["hello"]).unwrap();
        assert!(model.merges.is_empty());
        assert_eq!(model.vocab.len(), 256);
    }

    #[test]
    fn test_stops_early_when_pairs_run_out() {
        let model = trainer(1000, true).train(&["ab"]).unwrap();
        assert_eq!(model.merges.len(), 1);

        let model = trainer(1000, true).train::<&str>(&[]).unwrap();
        assert!(model.merges.is_empty());
    }

    #[test]
    fn test_huge_vocab_size_stops_early() {
        let model = trainer(usize::MAX / 2, false).train(&["ab"]).unwrap();
        assert_eq!(model.merges.len(), 1);
        assert_eq!(model.vocab.len(), 257);
    }

    #[test]
    fn test_ids_strictly_increasing() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(8);
        let model = trainer(300, true).train(&[text.as_str()]).unwrap();

        for (k, rule) in model.merges.iter().enumerate() {
            assert_eq!(rule.id, 256 + k as u32);
        }
    }

    #[test]
    fn test_deterministic_and_parallel_agnostic() {
        let chunks: Vec<String> = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do"
            .split(' ')
            .cycle()
            .take(300)
            .map(|w| format!(" {}", w))
            .collect();

        let a = trainer(320, true).train(&chunks).unwrap();
        let b = trainer(320, true).train(&chunks).unwrap();
        let c = trainer(320, false).train(&chunks).unwrap();
        let d = BpeTrainer::new(TrainingConfig {
            vocab_size: 320,
            verbose: true,
            ..Default::default()
        })
        .train(&chunks)
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn test_chunk_boundaries_respected() {
        let model = trainer(1000, false).train(&["ab", "ab"]).unwrap();
        let pairs: Vec<_> = model.merges.pairs().to_vec();
        assert_eq!(pairs, vec![(97, 98)]);
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let err = trainer(300, false)
            .with_cancellation(token)
            .train(&["aaaa"])
            .unwrap_err();
        assert!(matches!(
            err,
            TokenizerError::TrainingCancelled { completed: 0 }
        ));
    }

    #[test]
    fn test_timeout() {
        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: 300,
            timeout: Some(Duration::ZERO),
            ..Default::default()
        });
        assert!(matches!(
            trainer.train(&["aaaa"]),
            Err(TokenizerError::TrainingCancelled { .. })
        ));
    }
}
