//! Vocabulary reconstruction and decoding.
//!
//! The vocabulary is derived from a rule table on demand: ids 0-255 map to
//! their own byte and every learned id maps to the concatenation of its two
//! parts. Rules whose parts are not resolved yet are skipped, and decoding
//! drops ids the vocabulary does not know. Both are lenient on purpose;
//! well-formed tables never hit either path.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{DecodeError, ErrorMode},
    types::{ByteSeq, FIRST_MERGE_ID, RuleTable, Token},
};

/// Mapping from token id to its expanded byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Ids 0-255 hold single bytes; learned ids hold the concatenation of
    /// their two parts.
    entries: HashMap<Token, ByteSeq>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let entries = (0..FIRST_MERGE_ID).map(|id| (id, vec![id as u8])).collect();
        Self { entries }
    }
}

impl Vocabulary {
    /// Builds the vocabulary by walking `rules` in ascending rank order.
    ///
    /// # Arguments
    ///
    /// * `rules` - Rule table; ranks below 256 and rules whose parts are not
    ///   resolved yet are skipped.
    ///
    /// # Returns
    ///
    /// Vocabulary holding the 256 byte ids plus every resolvable rank.
    pub fn from_rules(rules: &RuleTable) -> Self {
        let mut vocab = Self::default();
        let mut skipped = 0usize;

        for rule in rules {
            // byte ids are immutable
            if rule.rank < FIRST_MERGE_ID {
                skipped += 1;
                continue;
            }
            let (Some(left), Some(right)) = (
                vocab.entries.get(&rule.pair.0),
                vocab.entries.get(&rule.pair.1),
            ) else {
                skipped += 1;
                continue;
            };

            let mut merged = Vec::with_capacity(left.len() + right.len());
            merged.extend_from_slice(left);
            merged.extend_from_slice(right);
            vocab.entries.insert(rule.rank, merged);
        }

        if skipped > 0 {
            debug!(skipped, "rules skipped while building vocabulary");
        }

        vocab
    }

    /// Returns the byte sequence of `id`, or `None` if it is not resolved.
    pub fn get(&self, id: Token) -> Option<&[u8]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Returns `true` if `id` expands to a byte sequence.
    pub fn contains(&self, id: Token) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of resolved ids, bytes included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` in practice: the byte ids are present from the start.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenates the bytes of every known id.
    ///
    /// # Arguments
    ///
    /// * `ids` - Token ids, typically produced by an encoder.
    ///
    /// # Returns
    ///
    /// Raw bytes of the known ids in order. Unknown ids are dropped.
    pub fn decode_bytes(&self, ids: &[Token]) -> ByteSeq {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = self.entries.get(id) {
                out.extend_from_slice(bytes);
            }
        }
        out
    }

    /// Decodes to text, replacing invalid UTF-8 with U+FFFD.
    pub fn decode(&self, ids: &[Token]) -> String {
        String::from_utf8_lossy(&self.decode_bytes(ids)).into_owned()
    }

    /// Decodes to text with the given UTF-8 error handling.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidUtf8`] in [`ErrorMode::Strict`] if the
    /// decoded bytes are not valid UTF-8.
    pub fn decode_with(&self, ids: &[Token], errors: ErrorMode) -> Result<String, DecodeError> {
        let bytes = self.decode_bytes(ids);
        match errors {
            ErrorMode::Strict => String::from_utf8(bytes).map_err(DecodeError::InvalidUtf8),
            ErrorMode::Replace => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}
