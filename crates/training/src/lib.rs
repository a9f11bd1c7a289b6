//! Bytepair-training - BPE training infrastructure
//!
//! This crate learns an ordered merge list from text that has already been
//! split into chunks.
//!
//! # Features
//!
//! - Parallel pair counting and chunk rewriting with rayon
//! - Deterministic pair selection, independent of thread count
//! - Cooperative cancellation and timeouts between merge steps
//!
//! # Example
//!
//! ```rust
//! use bytepair_training::{BpeTrainer, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 259,
//!     ..Default::default()
//! });
//! let model = trainer.train(&["aaabdaaabac"])?;
//! assert_eq!(model.merges.len(), 3);
//! # Ok::<(), bytepair_training::TokenizerError>(())
//! ```

pub use bytepair_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{BpeTrainer, CancellationToken, PairCounter, TrainedModel, TrainingConfig};
