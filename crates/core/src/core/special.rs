//! Special-token registration.
//!
//! A `SpecialTokens` value is an immutable snapshot: registration replaces
//! the whole map, never edits it in place. Registration order is kept so the
//! model file round-trips line for line.

use crate::core::merges::TokenId;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;

/// Literal string <-> id registry for special tokens.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokens {
    /// Literals in registration order
    entries: Vec<(CompactString, TokenId)>,
    /// literal -> id
    by_literal: AHashMap<CompactString, TokenId>,
    /// id -> literal
    by_id: AHashMap<TokenId, CompactString>,
}

impl SpecialTokens {
    /// No special tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(literal, id)` entries.
    ///
    /// Literals must be non-empty and fit on one line of the model file.
    /// A literal may appear only once; ids may be shared, and the last literal
    /// registered for an id is the one `literal(id)` returns.
    pub fn from_entries<S, I>(entries: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, TokenId)>,
    {
        let mut tokens = Self::new();
        for (literal, id) in entries {
            tokens.insert(literal.as_ref(), id)?;
        }
        Ok(tokens)
    }

    fn insert(&mut self, literal: &str, id: TokenId) -> Result<()> {
        if literal.is_empty() {
            return Err(TokenizerError::InvalidSpecialToken(
                "literal must not be empty".to_string(),
            ));
        }
        if literal.contains(['\n', '\r']) {
            return Err(TokenizerError::InvalidSpecialToken(format!(
                "literal {:?} contains a line break",
                literal
            )));
        }
        if self.by_literal.contains_key(literal) {
            return Err(TokenizerError::InvalidSpecialToken(format!(
                "literal {:?} registered twice",
                literal
            )));
        }

        let literal = CompactString::new(literal);
        self.entries.push((literal.clone(), id));
        self.by_literal.insert(literal.clone(), id);
        // several literals may share an id; the last one decodes
        self.by_id.insert(id, literal);
        Ok(())
    }

    /// Id registered for a literal.
    #[inline]
    pub fn id(&self, literal: &str) -> Option<TokenId> {
        self.by_literal.get(literal).copied()
    }

    /// Literal registered for an id.
    #[inline]
    pub fn literal(&self, id: TokenId) -> Option<&str> {
        self.by_id.get(&id).map(CompactString::as_str)
    }

    /// Whether `literal` is registered.
    #[inline]
    pub fn contains(&self, literal: &str) -> bool {
        self.by_literal.contains_key(literal)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> {
        self.entries.iter().map(|(s, id)| (s.as_str(), *id))
    }

    /// Number of registered tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        let tokens =
            SpecialTokens::from_entries([("<|endoftext|>", 100257), ("<|fim|>", 100258)]).unwrap();

        assert_eq!(tokens.id("<|endoftext|>"), Some(100257));
        assert_eq!(tokens.literal(100258), Some("<|fim|>"));
        assert_eq!(tokens.id("<|nope|>"), None);
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_registration_order_kept() {
        let tokens = SpecialTokens::from_entries([("<z>", 9), ("<a>", 3), ("<m>", 5)]).unwrap();
        let order: Vec<_> = tokens.iter().collect();
        assert_eq!(order, vec![("<z>", 9), ("<a>", 3), ("<m>", 5)]);
    }

    #[test]
    fn test_rejects_bad_entries() {
        assert!(SpecialTokens::from_entries([("", 1)]).is_err());
        assert!(SpecialTokens::from_entries([("a\nb", 1)]).is_err());
        assert!(SpecialTokens::from_entries([("<a>", 1), ("<a>", 2)]).is_err());
    }

    #[test]
    fn test_shared_id_resolves_to_last() {
        let tokens = SpecialTokens::from_entries([("<a>", 700), ("<b>", 700)]).unwrap();
        assert_eq!(tokens.id("<a>"), Some(700));
        assert_eq!(tokens.id("<b>"), Some(700));
        assert_eq!(tokens.literal(700), Some("<b>"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_literal_may_contain_spaces() {
        let tokens = SpecialTokens::from_entries([("<| end of text |>", 700)]).unwrap();
        assert_eq!(tokens.id("<| end of text |>"), Some(700));
    }
}
