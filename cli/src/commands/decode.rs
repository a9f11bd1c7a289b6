//! Decode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to a .model file
    #[arg(short, long)]
    pub model: PathBuf,

    /// Token IDs to decode (comma or space separated)
    #[arg(short, long)]
    pub tokens: String,
}

use anyhow::{Context, Result as AnyhowResult};
use bytepair_tokenizer::{TokenId, Tokenizer};

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.model)?;
    let ids = parse_ids(&cmd.tokens)?;

    let text = tokenizer.decode(&ids)?;
    println!("{}", text);

    Ok(())
}

fn parse_ids(tokens: &str) -> AnyhowResult<Vec<TokenId>> {
    tokens
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<TokenId>()
                .with_context(|| format!("invalid token id {:?}", s))
        })
        .collect()
}
