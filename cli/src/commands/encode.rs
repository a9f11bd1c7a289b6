//! Encode command implementation.

use clap::Parser;
use std::path::PathBuf;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to a .model file
    #[arg(short, long)]
    pub model: PathBuf,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Special-token policy: all, none or none_raise
    #[arg(short, long, default_value = "none_raise")]
    pub allowed_special: String,

    /// Allow only these special tokens (repeatable, overrides --allowed-special)
    #[arg(long = "allow")]
    pub allow: Vec<String>,

    /// Print a JSON object instead of space-separated ids
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

use anyhow::Result as AnyhowResult;
use bytepair_tokenizer::{AllowedSpecial, TokenId, Tokenizer};
use serde::Serialize;
use std::io::Read;

#[derive(Serialize)]
struct EncodeOutput<'a> {
    count: usize,
    ids: &'a [TokenId],
}

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(&cmd.model)?;

    // Read input text (from stdin if "-")
    let input_text = if cmd.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        cmd.input
    };

    let allowed = if cmd.allow.is_empty() {
        cmd.allowed_special.parse::<AllowedSpecial>()?
    } else {
        AllowedSpecial::subset(cmd.allow)
    };
    let ids = tokenizer.encode(&input_text, &allowed)?;

    let output = if cmd.json {
        serde_json::to_string(&EncodeOutput {
            count: ids.len(),
            ids: &ids,
        })?
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", ids.len(), path.display());
        }
        None => println!("{}", output),
    }

    Ok(())
}
