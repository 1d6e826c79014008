//! Merge-rule training.
//!
//! Text is split into chunks and every chunk is compressed independently:
//! each step merges the most frequent adjacent pair of that chunk and records
//! a rule for it. Rule ids come from one counter shared by all chunks, in
//! chunk order, starting at 256.
//!
//! Chunks can be learned on Rayon workers. Each worker numbers its new ids
//! from 256 as if it were the first chunk; a sequential pass then shifts every
//! learned id by the chunk's global offset. The shift keeps pair ordering
//! intact, so tie-breaks and therefore the output are identical to the
//! sequential run.

use std::cmp::Ordering;

use indicatif::{ParallelProgressIterator, ProgressIterator};
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::{
    error::TrainError,
    merge::{byte_tokens, merge_pair, pair_stats},
    pretokenizer::PreTokenizer,
    progress::optional_progress_bar,
    types::{FIRST_MERGE_ID, MergeRule, RuleTable, Token, TokenFreq, TokenPair},
};

/// Merge steps per chunk used by the command line tool.
pub const DEFAULT_MAX_STEPS_PER_CHUNK: usize = 100;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Upper bound on merges learned from a single chunk.
    pub max_steps_per_chunk: usize,
    /// Learn chunks on the Rayon pool.
    pub parallel: bool,
    /// Render a progress bar over chunks.
    pub show_progress: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_steps_per_chunk: DEFAULT_MAX_STEPS_PER_CHUNK,
            parallel: true,
            show_progress: false,
        }
    }
}

/// Candidate pair for the next merge step.
///
/// Highest frequency wins; ties go to the numerically smaller pair.
#[derive(Debug, PartialEq, Eq)]
struct Candidate {
    freq: TokenFreq,
    pair: TokenPair,
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed pair comparison makes the smaller pair the maximum on ties.
        self.freq
            .cmp(&other.freq)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

/// Learns merge rules from a text corpus.
pub struct Trainer {
    config: TrainerConfig,
    pretokenizer: PreTokenizer,
}

impl Trainer {
    /// Creates a trainer with the default split pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::PreTokenize`] if the split pattern fails to compile.
    pub fn new(config: TrainerConfig) -> Result<Self, TrainError> {
        Ok(Self {
            config,
            pretokenizer: PreTokenizer::new()?,
        })
    }

    /// Creates a trainer with a caller supplied splitter.
    pub fn with_pretokenizer(config: TrainerConfig, pretokenizer: PreTokenizer) -> Self {
        Self {
            config,
            pretokenizer,
        }
    }

    /// Returns the training configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Learns a rule table from `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TrainError::PreTokenize`] if the regex engine fails while
    /// splitting, or [`TrainError::ProgressBarSetup`] if the progress bar
    /// template fails to compile.
    pub fn train(&self, text: &str) -> Result<RuleTable, TrainError> {
        self.train_bytes(text.as_bytes())
    }

    /// Learns a rule table from raw corpus bytes.
    ///
    /// Runs of bytes that are not valid UTF-8 are learned as chunks of their
    /// own, so rules also cover corpora in legacy encodings.
    ///
    /// # Errors
    ///
    /// Same as [`train`](Self::train).
    pub fn train_bytes(&self, bytes: &[u8]) -> Result<RuleTable, TrainError> {
        let chunks = self.pretokenizer.split_bytes(bytes)?;
        let max_steps = self.config.max_steps_per_chunk;

        let pb = optional_progress_bar(
            self.config.show_progress,
            chunks.len() as u64,
            "Learning merges",
        )?;

        let rules = if self.config.parallel {
            let local: Vec<Vec<MergeRule>> = chunks
                .par_iter()
                .progress_with(pb)
                .map(|chunk| learn_chunk(chunk, FIRST_MERGE_ID, max_steps))
                .collect();
            reconcile(local)
        } else {
            let mut rules = Vec::new();
            let mut next_id = FIRST_MERGE_ID;
            for chunk in chunks.iter().progress_with(pb) {
                let learned = learn_chunk(chunk, next_id, max_steps);
                next_id += learned.len();
                rules.extend(learned);
            }
            rules
        };

        info!(
            chunks = chunks.len(),
            rules = rules.len(),
            parallel = self.config.parallel,
            "training finished"
        );

        Ok(RuleTable::new(rules))
    }
}

/// Sequential reference training with the default split pattern.
///
/// # Errors
///
/// Returns [`TrainError::PreTokenize`] if the regex engine fails.
pub fn train(text: &str, max_steps_per_chunk: usize) -> Result<RuleTable, TrainError> {
    let config = TrainerConfig {
        max_steps_per_chunk,
        parallel: false,
        show_progress: false,
    };
    Trainer::new(config)?.train(text)
}

/// Learns up to `max_steps` rules from one chunk, numbering them from `next_id`.
pub(crate) fn learn_chunk(bytes: &[u8], next_id: Token, max_steps: usize) -> Vec<MergeRule> {
    let mut ids = byte_tokens(bytes);
    let mut rules = Vec::new();
    let mut next_id = next_id;

    for _ in 0..max_steps {
        let stats = pair_stats(&ids);
        let Some(best) = stats
            .into_iter()
            .map(|(pair, freq)| Candidate { freq, pair })
            .max()
        else {
            break;
        };

        trace!(
            first = best.pair.0,
            second = best.pair.1,
            freq = best.freq,
            rank = next_id,
            "merge"
        );

        ids = merge_pair(&ids, best.pair, next_id);
        rules.push(MergeRule {
            pair: best.pair,
            rank: next_id,
        });
        next_id += 1;
    }

    rules
}

/// Renumbers chunk-local rule lists into one global sequence.
///
/// Every local list numbers its ids from [`FIRST_MERGE_ID`]; ids below that are
/// raw bytes and stay untouched.
fn reconcile(local: Vec<Vec<MergeRule>>) -> Vec<MergeRule> {
    let mut rules = Vec::with_capacity(local.iter().map(Vec::len).sum());
    let mut offset = 0;

    for chunk_rules in local {
        let shift = |id: Token| if id >= FIRST_MERGE_ID { id + offset } else { id };
        let learned = chunk_rules.len();
        rules.extend(chunk_rules.into_iter().map(|rule| MergeRule {
            pair: TokenPair(shift(rule.pair.0), shift(rule.pair.1)),
            rank: shift(rule.rank),
        }));
        offset += learned;
    }

    debug!(rules = rules.len(), "reconciled chunk-local rules");
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(max_steps: usize) -> TrainerConfig {
        TrainerConfig {
            max_steps_per_chunk: max_steps,
            parallel: false,
            show_progress: false,
        }
    }

    fn parallel(max_steps: usize) -> TrainerConfig {
        TrainerConfig {
            parallel: true,
            ..sequential(max_steps)
        }
    }

    #[test]
    fn test_first_two_merges_of_sample() {
        let rules = learn_chunk(b"aaabdaaabac", FIRST_MERGE_ID, 2);
        assert_eq!(
            rules,
            vec![MergeRule::new(97, 97, 256), MergeRule::new(97, 98, 257)]
        );
    }

    #[test]
    fn test_sample_chunk_rewrites() {
        let mut ids = byte_tokens(b"aaabdaaabac");
        for rule in learn_chunk(b"aaabdaaabac", FIRST_MERGE_ID, 2) {
            ids = merge_pair(&ids, rule.pair, rule.rank);
        }
        assert_eq!(ids, vec![256, 257, 100, 256, 257, 97, 99]);
    }

    #[test]
    fn test_tie_breaks_to_smaller_pair() {
        // every pair occurs once; (97, 98) < (98, 99)
        let rules = learn_chunk(b"abc", FIRST_MERGE_ID, 1);
        assert_eq!(rules, vec![MergeRule::new(97, 98, 256)]);
    }

    #[test]
    fn test_stops_when_chunk_collapses() {
        let rules = learn_chunk(b"abcd", FIRST_MERGE_ID, 100);
        // four bytes collapse into one token after three merges
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_single_byte_chunk_learns_nothing() {
        assert!(learn_chunk(b"a", FIRST_MERGE_ID, 100).is_empty());
        assert!(learn_chunk(b"", FIRST_MERGE_ID, 100).is_empty());
    }

    #[test]
    fn test_counter_shared_across_chunks() {
        let table = train("ab cd", 100).expect("training should succeed");
        // "ab" -> 256, " cd" -> 257, 258
        assert_eq!(
            table.as_slice(),
            &[
                MergeRule::new(97, 98, 256),
                MergeRule::new(32, 99, 257),
                MergeRule::new(257, 100, 258),
            ]
        );
    }

    #[test]
    fn test_ranks_are_gapless() {
        let text = "The quick brown fox jumps over the lazy dog. It's 2024!\n";
        let table = train(text, 100).expect("training should succeed");
        for (i, rule) in table.iter().enumerate() {
            assert_eq!(rule.rank, FIRST_MERGE_ID + i);
        }
    }

    #[test]
    fn test_duplicate_pairs_across_chunks() {
        let table = train("ab\nab", 100).expect("training should succeed");
        let ab = table
            .iter()
            .filter(|r| r.pair == TokenPair(97, 98))
            .count();
        assert_eq!(ab, 2);
    }

    #[test]
    fn test_empty_text() {
        assert!(train("", 100).expect("training should succeed").is_empty());
    }

    #[test]
    fn test_zero_steps() {
        assert!(train("hello", 0).expect("training should succeed").is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let text = "Hello there, hello again! Numbers 123456 and words like don't, can't.\n\
                    Mississippi banana bandana 1000000 ... /// \t\t end";
        let seq = Trainer::new(sequential(100))
            .expect("trainer init failed")
            .train(text)
            .expect("training should succeed");
        let par = Trainer::new(parallel(100))
            .expect("trainer init failed")
            .train(text)
            .expect("training should succeed");
        assert_eq!(seq, par);
    }

    #[test]
    fn test_custom_pretokenizer() {
        let pre = PreTokenizer::with_pattern(r"\S+|\s+").expect("pattern should compile");
        let trainer = Trainer::with_pretokenizer(sequential(1), pre);
        assert_eq!(trainer.config().max_steps_per_chunk, 1);
        // "ab" and " " and "ab": the space chunk has no pair
        let table = trainer.train("ab ab").expect("training should succeed");
        assert_eq!(
            table.merge_history(),
            vec![((97, 98), 256), ((97, 98), 257)]
        );
    }

    #[test]
    fn test_invalid_utf8_bytes_are_learned() {
        let trainer = Trainer::new(sequential(100)).expect("trainer init failed");
        let table = trainer
            .train_bytes(&[0xe9, 0xe9, 0xe9, 0xe9, 0x20, 0xe9, 0xe9])
            .expect("training should succeed");
        assert_eq!(table.as_slice()[0], MergeRule::new(0xe9, 0xe9, 256));
        assert!(table.iter().all(|r| r.pair.0 != 0xef && r.pair.0 != 0xbf));
    }

    #[test]
    fn test_reconcile_shifts_learned_ids_only() {
        let local = vec![
            vec![MergeRule::new(97, 98, 256)],
            vec![MergeRule::new(99, 100, 256), MergeRule::new(256, 101, 257)],
        ];
        assert_eq!(
            reconcile(local),
            vec![
                MergeRule::new(97, 98, 256),
                MergeRule::new(99, 100, 257),
                MergeRule::new(257, 101, 258),
            ]
        );
    }

    #[test]
    fn test_candidate_ordering() {
        let a = Candidate {
            freq: 2,
            pair: TokenPair(97, 98),
        };
        let b = Candidate {
            freq: 2,
            pair: TokenPair(256, 97),
        };
        let c = Candidate {
            freq: 3,
            pair: TokenPair(300, 300),
        };
        assert!(a > b);
        assert!(c > a);
    }
}
