//! BPE Encoder - applies a ranked rule table to new input.
//!
//! Every pass counts the adjacent pairs of the current sequence, picks the
//! pair whose rule has the lowest rank and replaces all of its
//! non-overlapping occurrences with that rank. Encoding stops when no pair of
//! the sequence has a rule.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    merge::{byte_tokens, merge_pair, pair_stats},
    types::{RuleTable, Token, TokenPair},
};

/// Applies learned merge rules to byte sequences.
///
/// # Example
///
/// ```ignore
/// let rules = RuleTable::from_merge_history(vec![((97, 98), 256), ((256, 99), 257)]);
/// let encoder = BPEEncoder::new(&rules);
/// assert_eq!(encoder.encode("abcab"), vec![257, 256]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BPEEncoder {
    /// Maps token pairs to the rank of their earliest rule.
    ///
    /// Later duplicates of a pair can never win, so they are not stored.
    ranks: HashMap<TokenPair, Token>,
}

impl BPEEncoder {
    /// Creates an encoder from a rule table.
    pub fn new(rules: &RuleTable) -> Self {
        let mut ranks = HashMap::with_capacity(rules.len());
        for rule in rules {
            ranks
                .entry(rule.pair)
                .and_modify(|rank: &mut Token| *rank = (*rank).min(rule.rank))
                .or_insert(rule.rank);
        }
        Self { ranks }
    }

    /// Encodes the UTF-8 bytes of `text`.
    pub fn encode(&self, text: &str) -> Vec<Token> {
        self.encode_bytes(text.as_bytes())
    }

    /// Encodes raw bytes; input need not be valid UTF-8.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<Token> {
        self.encode_tokens(byte_tokens(bytes))
    }

    /// Applies merges to an existing token sequence.
    pub fn encode_tokens(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut tokens = tokens;

        while tokens.len() >= 2 {
            let Some((pair, rank)) = self.best_merge(&tokens) else {
                break;
            };

            let merged = merge_pair(&tokens, pair, rank);
            // no progress means the rule table is inconsistent with the stats
            if merged.len() == tokens.len() {
                break;
            }

            trace!(first = pair.0, second = pair.1, rank, len = merged.len(), "applied merge");
            tokens = merged;
        }

        tokens
    }

    /// Checks if a token pair can be merged according to learned rules.
    pub fn can_merge(&self, left: Token, right: Token) -> bool {
        self.ranks.contains_key(&TokenPair(left, right))
    }

    /// Returns the rank that merges `(left, right)`, if any.
    pub fn rank_of(&self, left: Token, right: Token) -> Option<Token> {
        self.ranks.get(&TokenPair(left, right)).copied()
    }

    /// Returns the number of distinct mergeable pairs.
    pub fn num_merges(&self) -> usize {
        self.ranks.len()
    }

    /// Finds the present pair with the lowest rank.
    ///
    /// Distinct pairs sharing a rank only occur in malformed tables; the
    /// smaller pair wins so the result stays deterministic.
    fn best_merge(&self, tokens: &[Token]) -> Option<(TokenPair, Token)> {
        pair_stats(tokens)
            .into_keys()
            .filter_map(|pair| self.ranks.get(&pair).map(|&rank| (pair, rank)))
            .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
    }
}
