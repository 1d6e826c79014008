//! Training corpus collection.
//!
//! Walks a directory recursively and gathers every `.txt` file (extension
//! compared case-insensitively). Entries are visited in file name order so
//! the concatenated corpus, and therefore the learned rules, are reproducible.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::CorpusError;

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Reads every text file below `dir`.
///
/// Returns `(path relative to dir, raw contents)` pairs in traversal order.
/// Contents are kept as bytes; nothing is decoded or replaced.
///
/// # Errors
///
/// Returns [`CorpusError::Walk`] if `dir` (or a subdirectory) cannot be
/// traversed and [`CorpusError::Read`] if a matched file cannot be read.
pub fn read_text_files_in_dir(dir: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>, CorpusError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_text_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        let bytes = fs::read(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rel = path.strip_prefix(dir).unwrap_or(path).to_path_buf();

        debug!(path = %rel.display(), bytes = bytes.len(), "read corpus file");
        files.push((rel, bytes));
    }

    Ok(files)
}

/// Concatenates every text file below `dir` into one training corpus.
///
/// # Errors
///
/// Same as [`read_text_files_in_dir`].
pub fn read_corpus(dir: &Path) -> Result<Vec<u8>, CorpusError> {
    let files = read_text_files_in_dir(dir)?;
    let count = files.len();
    let corpus: Vec<u8> = files.into_iter().flat_map(|(_, bytes)| bytes).collect();

    info!(
        dir = %dir.display(),
        files = count,
        bytes = corpus.len(),
        "collected training corpus"
    );
    Ok(corpus)
}
