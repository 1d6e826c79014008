//! Splits raw text into merge-eligible chunks.
//!
//! The split pattern is an ordered alternation of five categories. Order
//! matters: the first alternative that matches at a position wins.
//!
//! 1. letter run (lowercase tail) with optional separator and contraction
//! 2. letter run (capitalized head) with optional separator and contraction
//! 3. one to three digits
//! 4. punctuation run with optional leading space and trailing `\r`, `\n`, `/`
//! 5. whitespace run
//!
//! Whitespace is the ASCII set `\t \n \f \r` plus space. Other Unicode
//! spaces fall into the punctuation category.

use fancy_regex::Regex;

use crate::error::PreTokenizeError;

/// Default English-oriented split pattern.
pub const DEFAULT_PATTERN: &str = concat!(
    r"[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]*[\p{Ll}\p{Lm}\p{Lo}\p{M}]+(?i:'s|'t|'re|'ve|'m|'ll|'d)?",
    r"|[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]+[\p{Ll}\p{Lm}\p{Lo}\p{M}]*(?i:'s|'t|'re|'ve|'m|'ll|'d)?",
    r"|\p{N}{1,3}",
    r"| ?[^\t\n\f\r \p{L}\p{N}]+[\r\n/]*",
    r"|[\t\n\f\r ]+",
);

/// Regex-driven chunk splitter.
#[derive(Debug, Clone)]
pub struct PreTokenizer {
    pattern: Regex,
}

impl PreTokenizer {
    /// Creates a splitter using [`DEFAULT_PATTERN`].
    ///
    /// # Errors
    ///
    /// Returns [`PreTokenizeError::InvalidPattern`] if the pattern fails to compile.
    pub fn new() -> Result<Self, PreTokenizeError> {
        Self::with_pattern(DEFAULT_PATTERN)
    }

    /// Creates a splitter from a custom pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PreTokenizeError::InvalidPattern`] if the pattern fails to compile.
    pub fn with_pattern(pattern: &str) -> Result<Self, PreTokenizeError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Splits `text` into non-empty chunks whose concatenation is `text`.
    ///
    /// Spans the pattern does not cover are emitted as chunks of their own.
    ///
    /// # Errors
    ///
    /// Returns [`PreTokenizeError::RegexMatch`] if the regex engine fails
    /// during matching.
    pub fn split<'t>(&self, text: &'t str) -> Result<Vec<&'t str>, PreTokenizeError> {
        let mut chunks = Vec::new();
        let mut last_end = 0;

        for mat in self.pattern.find_iter(text) {
            let m = mat.map_err(|e| PreTokenizeError::RegexMatch(e.to_string()))?;

            if m.start() > last_end {
                chunks.push(&text[last_end..m.start()]);
            }
            // empty matches would only happen with a custom pattern
            if !m.as_str().is_empty() {
                chunks.push(m.as_str());
            }
            last_end = m.end();
        }

        if last_end < text.len() {
            chunks.push(&text[last_end..]);
        }

        Ok(chunks)
    }

    /// Splits raw bytes into non-empty chunks whose concatenation is `bytes`.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Corpus data; need not be valid UTF-8.
    ///
    /// # Returns
    ///
    /// Valid UTF-8 runs split exactly like [`split`](Self::split). Each
    /// maximal run of bytes that are not valid UTF-8 becomes one chunk, so
    /// training sees those bytes unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PreTokenizeError::RegexMatch`] if the regex engine fails
    /// during matching.
    pub fn split_bytes<'t>(&self, bytes: &'t [u8]) -> Result<Vec<&'t [u8]>, PreTokenizeError> {
        let mut chunks = Vec::new();
        let mut pos = 0;
        // start of an invalid run not emitted yet
        let mut pending: Option<usize> = None;

        for piece in bytes.utf8_chunks() {
            let valid = piece.valid();
            if !valid.is_empty() {
                if let Some(start) = pending.take() {
                    chunks.push(&bytes[start..pos]);
                }
                chunks.extend(self.split(valid)?.into_iter().map(str::as_bytes));
                pos += valid.len();
            }

            let invalid = piece.invalid();
            if !invalid.is_empty() {
                pending.get_or_insert(pos);
                pos += invalid.len();
            }
        }

        if let Some(start) = pending {
            chunks.push(&bytes[start..pos]);
        }

        Ok(chunks)
    }
}
