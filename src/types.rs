//! Token ids, pairs and the ranked rule table shared by training, encoding
//! and persistence.

/// Represents a token identifier in the vocabulary.
///
/// Ids 0-255 are raw bytes; every id from 256 upwards is produced by exactly
/// one learned merge rule.
pub type Token = usize;

/// Frequency count for token pairs.
pub(crate) type TokenFreq = usize;

/// A sequence of raw bytes.
pub type ByteSeq = Vec<u8>;

/// Number of byte tokens; also the first id handed out to a learned merge.
pub const FIRST_MERGE_ID: Token = 256;

/// A pair of adjacent tokens.
///
/// Ordering is lexicographic on `(first, second)`. Training relies on it to
/// break frequency ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair(pub Token, pub Token);

/// A learned merge: `pair` is replaced by `rank`.
///
/// The rank doubles as the new token id and as the encoding priority
/// (lower = learned earlier = applied first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    pub pair: TokenPair,
    pub rank: Token,
}

impl MergeRule {
    /// Creates a rule that replaces `(first, second)` with `rank`.
    pub fn new(first: Token, second: Token, rank: Token) -> Self {
        Self {
            pair: TokenPair(first, second),
            rank,
        }
    }
}

/// Structural defect found by [`RuleTable::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDefect {
    /// Rank falls inside the raw byte range.
    RankBelowBase(Token),
    /// The same rank is produced by more than one rule.
    DuplicateRank(Token),
}

/// Ordered list of merge rules, ascending by rank.
///
/// The order is both insertion order and priority order. It is established
/// on construction and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<MergeRule>,
}

impl RuleTable {
    /// Builds a table from rules in any order.
    ///
    /// # Arguments
    ///
    /// * `rules` - Merge rules in any order. Nothing is validated here; see
    ///   [`validate`](Self::validate).
    ///
    /// # Returns
    ///
    /// Table sorted ascending by rank. Sorting is stable, so rules that share
    /// a rank keep their relative order.
    pub fn new(rules: impl IntoIterator<Item = MergeRule>) -> Self {
        let mut rules: Vec<MergeRule> = rules.into_iter().collect();
        rules.sort_by_key(|rule| rule.rank);
        Self { rules }
    }

    /// Builds a table from `((left, right), merged)` merge history tuples.
    pub fn from_merge_history(history: impl IntoIterator<Item = ((Token, Token), Token)>) -> Self {
        Self::new(
            history
                .into_iter()
                .map(|((first, second), rank)| MergeRule::new(first, second, rank)),
        )
    }

    /// Iterates over the rules in ascending rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, MergeRule> {
        self.rules.iter()
    }

    /// Number of rules, duplicates included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule was learned.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Borrows the rules as a rank-ordered slice.
    pub fn as_slice(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Returns the rules as `((left, right), merged)` tuples in rank order.
    pub fn merge_history(&self) -> Vec<((Token, Token), Token)> {
        self.rules
            .iter()
            .map(|rule| ((rule.pair.0, rule.pair.1), rule.rank))
            .collect()
    }

    /// Checks that every rank is a learned id and is assigned only once.
    ///
    /// Rules referencing ids that no earlier rule produces are not a defect;
    /// the vocabulary skips them.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleDefect`] found, in rank order.
    pub fn validate(&self) -> Result<(), RuleDefect> {
        let mut prev: Option<Token> = None;
        for rule in &self.rules {
            if rule.rank < FIRST_MERGE_ID {
                return Err(RuleDefect::RankBelowBase(rule.rank));
            }
            // sorted, so duplicates are adjacent
            if prev == Some(rule.rank) {
                return Err(RuleDefect::DuplicateRank(rule.rank));
            }
            prev = Some(rule.rank);
        }
        Ok(())
    }
}

impl FromIterator<MergeRule> for RuleTable {
    fn from_iter<I: IntoIterator<Item = MergeRule>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a MergeRule;
    type IntoIter = std::slice::Iter<'a, MergeRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
