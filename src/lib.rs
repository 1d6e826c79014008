//! Byte-level BPE tokenizer.
//!
//! Learns a ranked table of merge rules from a text corpus, applies it to new
//! text and reconstructs bytes from token ids:
//!
//! - [`pretokenizer`] splits training text into chunks,
//! - [`merge`] counts adjacent pairs and replaces one pair,
//! - [`trainer`] learns rules chunk by chunk,
//! - [`encoder`] applies rules by rank,
//! - [`vocab`] rebuilds id bytes and decodes,
//! - [`rules`] and [`corpus`] handle files.
//!
//! With the `python` feature the crate also builds as a PyO3 extension module.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]

pub mod corpus;
pub mod encoder;
pub mod error;
pub mod merge;
pub mod pretokenizer;
mod progress;
pub mod rules;
pub mod tokenizer;
pub mod trainer;
pub mod types;
pub mod vocab;

#[cfg(feature = "python")]
mod python;

pub use encoder::BPEEncoder;
pub use error::{
    CorpusError, DecodeError, EncodeError, ErrorMode, PreTokenizeError, RulesError, TrainError,
};
pub use merge::{merge_pair, pair_stats};
pub use pretokenizer::PreTokenizer;
pub use tokenizer::BPETokenizer;
pub use trainer::{Trainer, TrainerConfig, train};
pub use types::{ByteSeq, FIRST_MERGE_ID, MergeRule, RuleTable, Token, TokenPair};
pub use vocab::Vocabulary;

/// Encodes `text` with `rules`.
///
/// Builds a throwaway encoder; keep a [`BPEEncoder`] or [`BPETokenizer`]
/// around when encoding repeatedly.
pub fn encode(text: &str, rules: &RuleTable) -> Vec<Token> {
    BPEEncoder::new(rules).encode(text)
}

/// Builds the id to bytes mapping for `rules`.
pub fn build_vocabulary(rules: &RuleTable) -> Vocabulary {
    Vocabulary::from_rules(rules)
}

/// Decodes `ids` with `vocab`, dropping unknown ids and replacing invalid UTF-8.
pub fn decode(ids: &[Token], vocab: &Vocabulary) -> String {
    vocab.decode(ids)
}
