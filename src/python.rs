//! Python bindings, built with the `python` feature.

use std::path::PathBuf;

use pyo3::{
    exceptions::{PyIOError, PyValueError},
    prelude::*,
};

use crate::{
    error::{ErrorMode, RulesError},
    rules,
    tokenizer::BPETokenizer,
    trainer::{DEFAULT_MAX_STEPS_PER_CHUNK, TrainerConfig},
    types::{RuleTable, Token},
};

fn rules_err(e: RulesError) -> PyErr {
    match e {
        RulesError::Io { .. } | RulesError::Write(_) => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// Python wrapper for the BPE tokenizer.
#[pyclass(name = "Tokenizer")]
pub struct PyTokenizer {
    inner: BPETokenizer,
}

#[pymethods]
impl PyTokenizer {
    /// Builds a tokenizer from `((left, right), merged)` merge history.
    #[new]
    fn new(merge_history: Vec<((Token, Token), Token)>) -> Self {
        PyTokenizer {
            inner: BPETokenizer::new(RuleTable::from_merge_history(merge_history)),
        }
    }

    #[staticmethod]
    #[pyo3(signature = (text, max_steps_per_chunk = DEFAULT_MAX_STEPS_PER_CHUNK, show_progress = false))]
    fn train(text: &str, max_steps_per_chunk: usize, show_progress: bool) -> PyResult<Self> {
        let config = TrainerConfig {
            max_steps_per_chunk,
            show_progress,
            ..TrainerConfig::default()
        };
        let inner =
            BPETokenizer::train(text, &config).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyTokenizer { inner })
    }

    #[staticmethod]
    fn load(path: PathBuf) -> PyResult<Self> {
        let table = rules::load_rules(&path).map_err(rules_err)?;
        Ok(PyTokenizer {
            inner: BPETokenizer::new(table),
        })
    }

    fn save(&self, path: PathBuf) -> PyResult<()> {
        rules::save_rules(&path, self.inner.rules()).map_err(rules_err)
    }

    fn encode(&self, text: &str) -> Vec<Token> {
        self.inner.encode(text)
    }

    #[pyo3(signature = (texts, show_progress = false))]
    fn encode_batch(&self, texts: Vec<String>, show_progress: bool) -> PyResult<Vec<Vec<Token>>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.inner
            .encode_batch(&refs, show_progress)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    #[pyo3(signature = (tokens, errors = "replace"))]
    fn decode(&self, tokens: Vec<Token>, errors: &str) -> PyResult<String> {
        let mode: ErrorMode = errors.parse().map_err(PyValueError::new_err)?;
        self.inner
            .decode_with(&tokens, mode)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn merge_history(&self) -> Vec<((Token, Token), Token)> {
        self.inner.rules().merge_history()
    }

    #[getter]
    fn vocab_size(&self) -> usize {
        self.inner.vocab_size()
    }
}

#[pymodule]
fn _bytebpe(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTokenizer>()?;
    Ok(())
}
