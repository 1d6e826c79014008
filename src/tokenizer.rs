//! This module bundles a rule table with everything derived from it:
//! 1. The encoder (rank lookup for pairs).
//! 2. The vocabulary (id to bytes) used for decoding.
//!
//! The tokenizer supports both single-text and parallel batch encoding and
//! decoding via Rayon. Both derived structures are read-only after
//! construction, so one tokenizer can be shared across threads.

use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::{
    encoder::BPEEncoder,
    error::{DecodeError, EncodeError, ErrorMode, TrainError},
    progress::optional_progress_bar,
    trainer::{Trainer, TrainerConfig},
    types::{RuleTable, Token},
    vocab::Vocabulary,
};

/// BPE tokenizer that performs encoding and decoding with one rule table.
#[derive(Debug, Clone)]
pub struct BPETokenizer {
    rules: RuleTable,
    encoder: BPEEncoder,
    vocab: Vocabulary,
}

impl BPETokenizer {
    /// Creates a tokenizer from a learned rule table.
    pub fn new(rules: RuleTable) -> Self {
        let encoder = BPEEncoder::new(&rules);
        let vocab = Vocabulary::from_rules(&rules);
        Self {
            rules,
            encoder,
            vocab,
        }
    }

    /// Trains a rule table on `text` and wraps it in a tokenizer.
    ///
    /// # Errors
    ///
    /// Propagates any [`TrainError`] from the trainer.
    pub fn train(text: &str, config: &TrainerConfig) -> Result<Self, TrainError> {
        let rules = Trainer::new(config.clone())?.train(text)?;
        Ok(Self::new(rules))
    }

    /// Encodes the full text as one byte stream.
    pub fn encode(&self, text: &str) -> Vec<Token> {
        self.encoder.encode(text)
    }

    /// Encodes raw bytes; input need not be valid UTF-8.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<Token> {
        self.encoder.encode_bytes(bytes)
    }

    /// Encode many texts in parallel using Rayon.
    ///
    /// # Returns
    ///
    /// Vector of token sequences in the same order as input texts.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::ProgressBarSetup`] if the progress bar template
    /// fails to compile.
    pub fn encode_batch(
        &self,
        texts: &[&str],
        show_progress: bool,
    ) -> Result<Vec<Vec<Token>>, EncodeError> {
        let pb = optional_progress_bar(show_progress, texts.len() as u64, "Encoding texts")?;

        Ok(texts
            .par_iter()
            .progress_with(pb)
            .map(|text| self.encode(text))
            .collect())
    }

    /// Decodes tokens to text, replacing invalid UTF-8 with U+FFFD.
    ///
    /// Unknown ids are dropped.
    pub fn decode(&self, tokens: &[Token]) -> String {
        self.vocab.decode(tokens)
    }

    /// Decodes tokens to text with the given UTF-8 error handling.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidUtf8`] if the decoded bytes are not
    /// valid UTF-8 (only in `Strict` mode).
    pub fn decode_with(&self, tokens: &[Token], errors: ErrorMode) -> Result<String, DecodeError> {
        self.vocab.decode_with(tokens, errors)
    }

    /// Decodes multiple token sequences in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidUtf8`] if any sequence fails strict
    /// decoding, or [`DecodeError::ProgressBarSetup`] if the progress bar
    /// template fails to compile.
    pub fn decode_batch(
        &self,
        token_seqs: &[&[Token]],
        errors: ErrorMode,
        show_progress: bool,
    ) -> Result<Vec<String>, DecodeError> {
        let pb = optional_progress_bar(show_progress, token_seqs.len() as u64, "Decoding tokens")?;

        token_seqs
            .par_iter()
            .progress_with(pb)
            .map(|tokens| self.decode_with(tokens, errors))
            .collect()
    }

    /// Returns the number of resolved ids (bytes plus learned tokens).
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Returns the rule table the tokenizer was built from.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }
}
