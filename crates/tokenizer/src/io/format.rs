//! Model file and vocabulary dump formats.
//!
//! Model file layout, one item per line:
//!
//! ```text
//! minbpe v1
//! <pattern>
//! <n special tokens>
//! <literal> <id>        (n lines)
//! <left id> <right id>  (one line per merge, in rank order)
//! ```
//!
//! Merge ids are not stored: the k-th merge line always becomes `256 + k`.
//! The vocabulary dump is for people only and is never read back.

use bytepair_core::{
    render_token, MergeList, Result, SpecialTokens, TokenId, TokenizerError, Vocabulary,
};
use std::io::{self, Write};

/// First line of every model file.
pub const MODEL_VERSION: &str = "minbpe v1";

/// Extension appended to the save prefix for the model file.
pub const MODEL_EXTENSION: &str = "model";

/// Extension appended to the save prefix for the vocabulary dump.
pub const VOCAB_EXTENSION: &str = "vocab";

/// Everything the model file stores.
#[derive(Debug, Clone, Default)]
pub struct ModelFile {
    /// Split pattern; empty for byte-level tokenizers
    pub pattern: String,
    /// Special tokens in registration order
    pub special: SpecialTokens,
    /// Merge rules in rank order
    pub merges: MergeList,
}

impl ModelFile {
    /// Write the model file.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_model(w, &self.pattern, &self.special, &self.merges)
    }

    /// Parse a model file.
    ///
    /// # Errors
    /// `UnsupportedModelVersion` when the first line is not the expected tag,
    /// `MalformedModelFile` for any other structural problem.
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (_, version) = lines
            .next()
            .ok_or_else(|| TokenizerError::malformed(1, "empty model file"))?;
        if version.trim() != MODEL_VERSION {
            return Err(TokenizerError::UnsupportedModelVersion(
                version.trim().to_string(),
            ));
        }

        let (_, pattern) = lines
            .next()
            .ok_or_else(|| TokenizerError::malformed(2, "missing pattern line"))?;

        let (count_line, count) = lines
            .next()
            .ok_or_else(|| TokenizerError::malformed(3, "missing special token count"))?;
        let count: usize = count.trim().parse().map_err(|_| {
            TokenizerError::malformed(count_line, format!("invalid special token count {:?}", count))
        })?;

        let mut entries: Vec<(&str, TokenId)> = Vec::with_capacity(count);
        for k in 0..count {
            let (n, line) = lines.next().ok_or_else(|| {
                TokenizerError::malformed(
                    count_line + k + 1,
                    format!("expected {} special tokens, found {}", count, k),
                )
            })?;
            let (literal, id) = line
                .rsplit_once(' ')
                .ok_or_else(|| TokenizerError::malformed(n, "expected \"<literal> <id>\""))?;
            let id = id.trim().parse().map_err(|_| {
                TokenizerError::malformed(n, format!("invalid special token id {:?}", id))
            })?;
            entries.push((literal, id));
        }
        let special = SpecialTokens::from_entries(entries)
            .map_err(|e| TokenizerError::malformed(count_line, e.to_string()))?;

        let mut merges = MergeList::new();
        for (n, line) in lines {
            let mut parts = line.split_whitespace();
            let pair = match (parts.next(), parts.next(), parts.next()) {
                (Some(left), Some(right), None) => left.parse().ok().zip(right.parse().ok()),
                _ => None,
            };
            let pair = pair.ok_or_else(|| {
                TokenizerError::malformed(n, format!("expected \"<left> <right>\", got {:?}", line))
            })?;
            merges
                .push(pair)
                .map_err(|e| TokenizerError::malformed(n, e.to_string()))?;
        }

        Ok(Self {
            pattern: pattern.to_string(),
            special,
            merges,
        })
    }
}

/// Write a model file from borrowed tables.
pub fn write_model<W: Write>(
    w: &mut W,
    pattern: &str,
    special: &SpecialTokens,
    merges: &MergeList,
) -> io::Result<()> {
    writeln!(w, "{}", MODEL_VERSION)?;
    writeln!(w, "{}", pattern)?;
    writeln!(w, "{}", special.len())?;
    for (literal, id) in special.iter() {
        writeln!(w, "{} {}", literal, id)?;
    }
    for &(left, right) in merges.pairs() {
        writeln!(w, "{} {}", left, right)?;
    }
    Ok(())
}

/// Write the human-readable vocabulary dump.
///
/// Merge-derived ids show their parents as `[left][right] -> [token] id`;
/// byte ids and special tokens are `token id`.
pub fn write_vocab_dump<W: Write>(
    w: &mut W,
    merges: &MergeList,
    vocab: &Vocabulary,
    special: &SpecialTokens,
) -> io::Result<()> {
    for (id, bytes) in vocab.iter() {
        let s = render_token(bytes);
        match merges.parents(id) {
            Some((left, right)) => {
                let s0 = vocab.get(left).map(render_token).unwrap_or_default();
                let s1 = vocab.get(right).map(render_token).unwrap_or_default();
                writeln!(w, "[{}][{}] -> [{}] {}", s0, s1, s, id)?;
            }
            None => writeln!(w, "{} {}", s, id)?,
        }
    }
    for (literal, id) in special.iter() {
        writeln!(w, "{} {}", render_token(literal.as_bytes()), id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelFile {
        ModelFile {
            pattern: r"\p{L}+| ?\p{N}+".to_string(),
            special: SpecialTokens::from_entries([("<|endoftext|>", 100257), ("<| sp |>", 9)])
                .unwrap(),
            merges: MergeList::from_pairs([(97, 97), (97, 98), (256, 257)]).unwrap(),
        }
    }

    fn render(model: &ModelFile) -> String {
        let mut buf = Vec::new();
        model.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_exact_layout() {
        assert_eq!(
            render(&sample()),
            "minbpe v1\n\\p{L}+| ?\\p{N}+\n2\n<|endoftext|> 100257\n<| sp |> 9\n97 97\n97 98\n256 257\n"
        );
    }

    #[test]
    fn test_parse_written_file() {
        let parsed = ModelFile::parse(&render(&sample())).unwrap();
        assert_eq!(parsed.pattern, sample().pattern);
        assert_eq!(parsed.merges, sample().merges);
        assert_eq!(parsed.special.id("<| sp |>"), Some(9));
        assert_eq!(parsed.special.id("<|endoftext|>"), Some(100257));
    }

    #[test]
    fn test_rank_comes_from_line_order() {
        let parsed = ModelFile::parse("minbpe v1\n\n0\n98 99\n97 98\n").unwrap();
        assert_eq!(parsed.merges.merged_id((98, 99)), Some(256));
        assert_eq!(parsed.merges.merged_id((97, 98)), Some(257));
        assert_eq!(parsed.pattern, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let parsed = ModelFile::parse("minbpe v1\r\n\r\n0\r\n97 98\r\n").unwrap();
        assert_eq!(parsed.pattern, "");
        assert_eq!(parsed.merges.len(), 1);
    }

    #[test]
    fn test_special_tokens_may_share_an_id() {
        let content = "minbpe v1\n\n2\n<s> 300\n<|start|> 300\n97 97\n";
        let parsed = ModelFile::parse(content).unwrap();
        assert_eq!(parsed.special.id("<s>"), Some(300));
        assert_eq!(parsed.special.literal(300), Some("<|start|>"));
        assert_eq!(render(&parsed), content);
    }

    #[test]
    fn test_wrong_version() {
        let err = ModelFile::parse("minbpe v2\n\n0\n").unwrap_err();
        assert!(matches!(err, TokenizerError::UnsupportedModelVersion(v) if v == "minbpe v2"));
    }

    #[test]
    fn test_malformed_files() {
        let cases = [
            ("", 1),
            ("minbpe v1\n", 2),
            ("minbpe v1\n\n", 3),
            ("minbpe v1\n\nx\n", 3),
            ("minbpe v1\n\n2\n<a> 1\n", 5),
            ("minbpe v1\n\n1\n<a>x\n", 4),
            ("minbpe v1\n\n0\n97\n", 4),
            ("minbpe v1\n\n0\n97 98 99\n", 4),
            ("minbpe v1\n\n0\n97 98\n\n", 5),
            ("minbpe v1\n\n0\n97 300\n", 4),
            ("minbpe v1\n\n0\n97 98\n97 98\n", 5),
        ];
        for (content, expected_line) in cases {
            match ModelFile::parse(content) {
                Err(TokenizerError::MalformedModelFile { line, .. }) => {
                    assert_eq!(line, expected_line, "content {:?}", content)
                }
                other => panic!("expected malformed error for {:?}, got {:?}", content, other),
            }
        }
    }

    #[test]
    fn test_vocab_dump() {
        let merges = MergeList::from_pairs([(97, 97), (256, 10)]).unwrap();
        let vocab = Vocabulary::from_merges(&merges).unwrap();
        let special = SpecialTokens::from_entries([("<|eot|>", 300)]).unwrap();

        let mut buf = Vec::new();
        write_vocab_dump(&mut buf, &merges, &vocab, &special).unwrap();
        let dump = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 256 + 2 + 1);
        assert_eq!(lines[10], "\\u000a 10");
        assert_eq!(lines[97], "a 97");
        assert_eq!(lines[256], "[a][a] -> [aa] 256");
        assert_eq!(lines[257], "[aa][\\u000a] -> [aa\\u000a] 257");
        assert_eq!(lines[258], "<|eot|> 300");
        assert!(!dump.contains('\r'));
    }
}
