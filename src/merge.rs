//! Pair statistics and the single-pass merge engine.
//!
//! Both functions are total and allocation-only; training and encoding call
//! them once per merge step.

use std::collections::HashMap;

use crate::types::{Token, TokenFreq, TokenPair};

/// Counts every adjacent `(ids[i], ids[i + 1])` occurrence.
///
/// Returns an empty map for sequences shorter than two tokens.
pub fn pair_stats(ids: &[Token]) -> HashMap<TokenPair, TokenFreq> {
    let mut stats = HashMap::with_capacity(ids.len());
    for window in ids.windows(2) {
        *stats.entry(TokenPair(window[0], window[1])).or_insert(0) += 1;
    }
    stats
}

/// Replaces every non-overlapping occurrence of `pair` with `new_id`.
///
/// Scans left to right. A match consumes both of its tokens, so the freshly
/// emitted `new_id` is never re-examined within the same call.
pub fn merge_pair(ids: &[Token], pair: TokenPair, new_id: Token) -> Vec<Token> {
    let mut out = Vec::with_capacity(ids.len());
    let mut i = 0;

    while i < ids.len() {
        if i + 1 < ids.len() && ids[i] == pair.0 && ids[i + 1] == pair.1 {
            out.push(new_id);
            i += 2;
        } else {
            out.push(ids[i]);
            i += 1;
        }
    }

    out
}

/// Converts bytes to their identity token ids.
pub(crate) fn byte_tokens(bytes: &[u8]) -> Vec<Token> {
    bytes.iter().map(|&b| b as Token).collect()
}
