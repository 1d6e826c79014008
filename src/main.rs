//! Command line front end.
//!
//! ```bash
//! # learn rules from every .txt file below corpus/
//! bytebpe --mode train --train-dir corpus/ --out-rules merges.json
//!
//! # encode a file with those rules
//! bytebpe --mode encode --rules-file merges.json --input-file input.txt
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use bytebpe::{
    BPEEncoder, Token, Trainer, TrainerConfig, corpus, rules, trainer::DEFAULT_MAX_STEPS_PER_CHUNK,
};
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Learn merge rules from a corpus directory
    Train,
    /// Encode a file with a rule file
    Encode,
}

/// Byte-level BPE trainer and encoder
#[derive(Parser, Debug)]
#[command(name = "bytebpe")]
#[command(version)]
struct Args {
    /// Operation to run
    #[arg(long, value_enum)]
    mode: Mode,

    /// Directory searched recursively for .txt training files
    #[arg(long)]
    train_dir: Option<PathBuf>,

    /// Where to write the learned rules
    #[arg(long, default_value = "merges.json")]
    out_rules: PathBuf,

    /// Rule file produced by a training run
    #[arg(long)]
    rules_file: Option<PathBuf>,

    /// File to encode
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Merge steps learned per chunk
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS_PER_CHUNK)]
    max_steps_per_chunk: usize,

    /// Show a progress bar while training
    #[arg(long)]
    progress: bool,

    /// Log filter, e.g. "info" or "bytebpe=trace"
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level: {level}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    match args.mode {
        Mode::Train => {
            let Some(train_dir) = args.train_dir.as_deref() else {
                bail!("--train-dir is required in train mode");
            };
            let config = TrainerConfig {
                max_steps_per_chunk: args.max_steps_per_chunk,
                show_progress: args.progress,
                ..TrainerConfig::default()
            };
            run_train(train_dir, &args.out_rules, config)
        }
        Mode::Encode => {
            let (Some(rules_file), Some(input_file)) =
                (args.rules_file.as_deref(), args.input_file.as_deref())
            else {
                bail!("--rules-file and --input-file are both required in encode mode");
            };
            run_encode(rules_file, input_file)
        }
    }
}

fn run_train(train_dir: &Path, out_rules: &Path, config: TrainerConfig) -> Result<()> {
    let data = corpus::read_corpus(train_dir)
        .with_context(|| format!("failed to read corpus from {}", train_dir.display()))?;

    let table = Trainer::new(config)?
        .train_bytes(&data)
        .context("training failed")?;
    rules::save_rules(out_rules, &table)?;

    println!("saved: {} ({} rules)", out_rules.display(), table.len());
    Ok(())
}

fn run_encode(rules_file: &Path, input_file: &Path) -> Result<()> {
    let table = rules::load_rules(rules_file)?;
    let data = fs::read(input_file)
        .with_context(|| format!("failed to read {}", input_file.display()))?;

    let ids = BPEEncoder::new(&table).encode_bytes(&data);
    info!(bytes = data.len(), tokens = ids.len(), "encoded input");

    println!("{}", format_ids(&ids));
    Ok(())
}

/// Renders ids as `[a b c]`.
fn format_ids(ids: &[Token]) -> String {
    let body: Vec<String> = ids.iter().map(Token::to_string).collect();
    format!("[{}]", body.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ids() {
        assert_eq!(format_ids(&[]), "[]");
        assert_eq!(format_ids(&[256, 97, 99]), "[256 97 99]");
    }

    #[test]
    fn test_cli_parses_train() {
        let args = Args::try_parse_from([
            "bytebpe",
            "--mode",
            "train",
            "--train-dir",
            "corpus",
        ])
        .expect("arguments should parse");
        assert_eq!(args.mode, Mode::Train);
        assert_eq!(args.out_rules, PathBuf::from("merges.json"));
        assert_eq!(args.max_steps_per_chunk, 100);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Args::try_parse_from(["bytebpe", "--mode", "decode"]).is_err());
        assert!(Args::try_parse_from(["bytebpe"]).is_err());
    }
}
