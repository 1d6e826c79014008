//! Error types for tokenizer, trainer and persistence operations.

use std::{io, path::PathBuf, str::FromStr};

use indicatif::style::TemplateError;
use thiserror::Error;

use crate::types::Token;

/// Controls how UTF-8 decoding errors are handled.
///
/// Mirrors Python's `bytes.decode(errors=...)` semantics.
/// Unknown token IDs are dropped in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on invalid UTF-8 like Python's "strict".
    Strict,
    /// Replace invalid UTF-8 sequences with U+FFFD (like Python's "replace").
    #[default]
    Replace,
}

impl FromStr for ErrorMode {
    type Err = String;

    /// Parses a Python-style error mode string ("strict" or "replace").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "replace" => Ok(Self::Replace),
            _ => Err(format!(
                "invalid error mode: {s:?} (expected \"strict\" or \"replace\")"
            )),
        }
    }
}

/// Errors raised while splitting text into chunks.
#[derive(Debug, Error)]
pub enum PreTokenizeError {
    /// The split pattern failed to compile.
    #[error("invalid split pattern: {0}")]
    InvalidPattern(#[from] fancy_regex::Error),
    /// Regex engine failed during matching (e.g. backtracking limit exceeded).
    #[error("regex match failed: {0}")]
    RegexMatch(String),
}

/// Errors that can occur while learning merge rules.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    PreTokenize(#[from] PreTokenizeError),
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// Errors that can occur during batch encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// Errors that can occur during token decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Decoded bytes are not valid UTF-8 (strict mode only).
    #[error("invalid UTF-8 in decoded bytes: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// Progress bar template string was invalid.
    #[error("template parsing failed: {0}")]
    ProgressBarSetup(#[from] TemplateError),
}

/// Errors raised while collecting a training corpus from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The directory could not be traversed.
    #[error("failed to walk corpus directory: {0}")]
    Walk(#[from] walkdir::Error),
    /// A matched file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while saving or loading a rule file.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rule file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing serialized rules to the output failed.
    #[error("failed to write rule data: {0}")]
    Write(#[source] io::Error),
    /// The document is not a valid rule list.
    #[error("malformed rule data: {0}")]
    Json(#[from] serde_json::Error),
    /// A rule produces an id inside the raw byte range.
    #[error("rule rank {0} collides with a byte token")]
    InvalidRank(Token),
    /// Two rules produce the same id.
    #[error("rule rank {0} is assigned more than once")]
    DuplicateRank(Token),
}
