//! Persistence for trained tokenizers.
//!
//! A tokenizer is saved as a line-oriented `.model` file plus a `.vocab`
//! dump. Only the model file is ever read back.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFile, MODEL_EXTENSION, MODEL_VERSION, VOCAB_EXTENSION};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
