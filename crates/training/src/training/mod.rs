//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the training loop and the pair counter it drives.

pub mod counter;
pub mod trainer;

pub use counter::PairCounter;
pub use trainer::{BpeTrainer, CancellationToken, TrainedModel, TrainingConfig};
