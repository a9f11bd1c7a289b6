//! Special-token interleaving policy.
//!
//! Before chunking, text is cut at the special-token literals the caller
//! allows. Allowed literals become `Span::Special` and bypass merging;
//! everything between them is an `Span::Ordinary` run.

use bytepair_core::{Result, SpecialTokens, TokenId, TokenizerError};
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::str::FromStr;

/// Which registered special tokens an encode call may emit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedSpecial {
    /// Every registered token
    All,
    /// None; literals are encoded as ordinary text
    None,
    /// None, and any registered literal in the input is an error
    #[default]
    NoneRaise,
    /// Only the named literals
    Subset(BTreeSet<String>),
}

impl AllowedSpecial {
    /// Allow only the given literals.
    pub fn subset<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::Subset(names.into_iter().map(Into::into).collect())
    }
}

impl FromStr for AllowedSpecial {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "none" => Ok(Self::None),
            "none_raise" => Ok(Self::NoneRaise),
            other => Err(TokenizerError::UnknownAllowedSpecialPolicy(other.to_string())),
        }
    }
}

/// A piece of the input after special-token splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'t> {
    /// Text to run through chunking and merging
    Ordinary(&'t str),
    /// An allowed special literal, emitted as its id
    Special(TokenId),
}

/// Applies an `AllowedSpecial` choice to one special-token snapshot.
pub struct SpecialTokenPolicy<'a> {
    tokens: &'a SpecialTokens,
    allowed: &'a AllowedSpecial,
}

impl<'a> SpecialTokenPolicy<'a> {
    pub fn new(tokens: &'a SpecialTokens, allowed: &'a AllowedSpecial) -> Self {
        Self { tokens, allowed }
    }

    /// Literals this policy lets through, for the given input.
    ///
    /// `NoneRaise` fails on the first registered literal (in registration
    /// order) that occurs in `text`.
    pub fn resolve(&self, text: &str) -> Result<Vec<(&'a str, TokenId)>> {
        match self.allowed {
            AllowedSpecial::All => Ok(self.tokens.iter().collect()),
            AllowedSpecial::None => Ok(Vec::new()),
            AllowedSpecial::NoneRaise => {
                if let Some((literal, _)) = self.tokens.iter().find(|(s, _)| text.contains(*s)) {
                    return Err(TokenizerError::DisallowedSpecialToken(literal.to_string()));
                }
                Ok(Vec::new())
            }
            AllowedSpecial::Subset(names) => {
                for name in names.iter().filter(|n| !self.tokens.contains(n)) {
                    debug!("allowed special token {:?} is not registered", name);
                }
                Ok(self
                    .tokens
                    .iter()
                    .filter(|(s, _)| names.contains(*s))
                    .collect())
            }
        }
    }

    /// Cut `text` into ordinary and special spans, covering it without gaps.
    ///
    /// Where two allowed literals match at the same position the longer one
    /// wins.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<Span<'t>>> {
        let mut allowed = self.resolve(text)?;
        if allowed.is_empty() {
            return Ok(if text.is_empty() {
                Vec::new()
            } else {
                vec![Span::Ordinary(text)]
            });
        }

        // Leftmost-first alternation: put longer literals first
        allowed.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = allowed
            .iter()
            .map(|(s, _)| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&alternation).map_err(|e| TokenizerError::InvalidPattern(e.to_string()))?;

        let mut spans = Vec::new();
        let mut last = 0;
        for m in re.find_iter(text) {
            if m.start() > last {
                spans.push(Span::Ordinary(&text[last..m.start()]));
            }
            let id = self.tokens.id(m.as_str()).ok_or_else(|| {
                TokenizerError::InvalidSpecialToken(format!("{:?} is not registered", m.as_str()))
            })?;
            spans.push(Span::Special(id));
            last = m.end();
        }
        if last < text.len() {
            spans.push(Span::Ordinary(&text[last..]));
        }

        Ok(spans)
    }
}
