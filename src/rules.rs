//! JSON persistence of rule tables.
//!
//! A rule file is an array of records in ascending rank order:
//!
//! ```json
//! [
//!   {
//!     "Pair": {
//!       "First": 97,
//!       "Second": 97
//!     },
//!     "Rank": 256
//!   }
//! ]
//! ```
//!
//! A `null` document is read as an empty table. Serialization details stay in
//! this module; the rest of the crate only sees [`RuleTable`].

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::RulesError,
    types::{MergeRule, RuleDefect, RuleTable, Token},
};

#[derive(Debug, Serialize, Deserialize)]
struct PairRecord {
    #[serde(rename = "First", alias = "first")]
    first: Token,
    #[serde(rename = "Second", alias = "second")]
    second: Token,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleRecord {
    #[serde(rename = "Pair", alias = "pair")]
    pair: PairRecord,
    #[serde(rename = "Rank", alias = "rank")]
    rank: Token,
}

impl From<&MergeRule> for RuleRecord {
    fn from(rule: &MergeRule) -> Self {
        Self {
            pair: PairRecord {
                first: rule.pair.0,
                second: rule.pair.1,
            },
            rank: rule.rank,
        }
    }
}

impl From<RuleRecord> for MergeRule {
    fn from(record: RuleRecord) -> Self {
        MergeRule::new(record.pair.first, record.pair.second, record.rank)
    }
}

impl From<RuleDefect> for RulesError {
    fn from(defect: RuleDefect) -> Self {
        match defect {
            RuleDefect::RankBelowBase(rank) => Self::InvalidRank(rank),
            RuleDefect::DuplicateRank(rank) => Self::DuplicateRank(rank),
        }
    }
}

/// Writes `rules` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns [`RulesError::Write`] if the underlying writer fails and
/// [`RulesError::Json`] if the records cannot be serialized.
pub fn to_writer<W: Write>(mut writer: W, rules: &RuleTable) -> Result<(), RulesError> {
    let records: Vec<RuleRecord> = rules.iter().map(RuleRecord::from).collect();
    serde_json::to_writer_pretty(&mut writer, &records).map_err(|e| {
        if e.is_io() {
            RulesError::Write(e.into())
        } else {
            RulesError::Json(e)
        }
    })?;
    writer.write_all(b"\n").map_err(RulesError::Write)?;
    Ok(())
}

/// Reads and validates a rule table.
///
/// # Errors
///
/// Returns [`RulesError::Json`] for malformed data, or
/// [`RulesError::InvalidRank`] / [`RulesError::DuplicateRank`] for tables
/// that cannot have come from training.
pub fn from_reader<R: Read>(reader: R) -> Result<RuleTable, RulesError> {
    let records: Option<Vec<RuleRecord>> = serde_json::from_reader(reader)?;
    into_table(records)
}

/// Parses and validates a rule table from a string.
///
/// # Errors
///
/// Same as [`from_reader`].
pub fn from_str(json: &str) -> Result<RuleTable, RulesError> {
    let records: Option<Vec<RuleRecord>> = serde_json::from_str(json)?;
    into_table(records)
}

/// Saves `rules` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`RulesError::Io`] if the file cannot be created or written.
pub fn save_rules(path: &Path, rules: &RuleTable) -> Result<(), RulesError> {
    let io_err = |source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    to_writer(&mut writer, rules).map_err(|e| match e {
        RulesError::Write(source) => io_err(source),
        other => other,
    })?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), rules = rules.len(), "saved rule table");
    Ok(())
}

/// Loads a rule table from `path`.
///
/// # Errors
///
/// Returns [`RulesError::Io`] if the file cannot be opened, otherwise the
/// errors of [`from_reader`].
pub fn load_rules(path: &Path) -> Result<RuleTable, RulesError> {
    let file = File::open(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = from_reader(BufReader::new(file))?;

    info!(path = %path.display(), rules = rules.len(), "loaded rule table");
    Ok(rules)
}

fn into_table(records: Option<Vec<RuleRecord>>) -> Result<RuleTable, RulesError> {
    let table: RuleTable = records
        .unwrap_or_default()
        .into_iter()
        .map(MergeRule::from)
        .collect();
    table.validate()?;
    Ok(table)
}
