//! Train command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Split pattern used by GPT-4 (cl100k_base).
pub const GPT4_SPLIT_PATTERN: &str = r"'(?i:[sdmt]|ll|ve|re)|[^\r\n\p{L}\p{N}]?+\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]++[\r\n]*|\s*[\r\n]|\s+(?!\S)|\s+";

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training data file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output prefix; writes <prefix>.model and <prefix>.vocab
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target vocabulary size (at least 256)
    #[arg(short, long, default_value_t = 512)]
    pub vocab_size: usize,

    /// Chunk split pattern
    #[arg(short, long, default_value = GPT4_SPLIT_PATTERN, conflicts_with = "byte_level")]
    pub pattern: String,

    /// Do not split the text into chunks
    #[arg(long, default_value_t = false)]
    pub byte_level: bool,

    /// JSON object of special tokens, e.g. {"<|endoftext|>": 100257}
    #[arg(short, long)]
    pub special_tokens: Option<PathBuf>,

    /// Log every merge
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Stop training after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Count pairs on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::{TokenId, Tokenizer};
use bytepair_training::TrainingConfig;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    println!("Training tokenizer...");
    println!("  Input: {}", cmd.input.display());
    println!("  Output prefix: {}", cmd.output.display());
    println!("  Vocab size: {}", cmd.vocab_size);
    if cmd.byte_level {
        println!("  Chunking: none (byte-level)");
    } else {
        println!("  Pattern: {}", cmd.pattern);
    }
    println!();

    // Read training data
    let start = Instant::now();
    let data = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input.display()))?;
    info!("Read {} bytes in {:.2}s", data.len(), start.elapsed().as_secs_f64());

    let mut builder = Tokenizer::builder();
    builder = if cmd.byte_level {
        builder.byte_level()
    } else {
        builder.pattern(cmd.pattern.as_str())
    };
    let mut tokenizer = builder.build()?;

    // Train
    let config = TrainingConfig {
        vocab_size: cmd.vocab_size,
        verbose: cmd.verbose,
        parallel: !cmd.sequential,
        timeout: cmd.timeout_secs.map(Duration::from_secs),
    };
    let start = Instant::now();
    let (merges, _) = tokenizer.train_with(&data, config, None)?;
    println!(
        "Learned {} merges in {:.2}s",
        merges.len(),
        start.elapsed().as_secs_f64()
    );

    if let Some(path) = &cmd.special_tokens {
        let tokens = read_special_tokens(path)?;
        info!("Registering {} special tokens from {}", tokens.len(), path.display());
        tokenizer.register_special_tokens(tokens)?;
    }
    println!("Final vocab size: {}", tokenizer.vocab_size());

    // Save model
    let model_path = tokenizer.save(&cmd.output)?;
    println!("Model saved to {}", model_path.display());

    Ok(())
}

/// Read a `{"literal": id}` JSON object, ordered by id.
fn read_special_tokens(path: &Path) -> AnyhowResult<Vec<(String, TokenId)>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let map: HashMap<String, TokenId> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON object of special tokens", path.display()))?;

    let mut tokens: Vec<_> = map.into_iter().collect();
    tokens.sort_by(|(a, x), (b, y)| x.cmp(y).then_with(|| a.cmp(b)));
    Ok(tokens)
}
