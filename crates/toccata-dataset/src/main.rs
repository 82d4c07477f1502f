use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use toccata_dataset::{FilterConfig, ScoreDataset, TokenizedDataset};
use toccata_tokenizer::{EventTokenizer, TokenizerConfig};

#[derive(Parser, Debug)]
#[command(name = "toccata-dataset")]
#[command(about = "Build tokenizer training datasets from directories of MIDI files", long_about = None)]
struct Args {
    /// Directory to index MIDI files from
    dir: PathBuf,

    /// Recursively search subdirectories
    #[arg(short, long)]
    recur: bool,

    /// Output file path (default: `dataset.json`)
    #[arg(short, long, default_value = "dataset.json")]
    output: PathBuf,

    /// Filter configuration file (JSON); defaults apply when omitted
    #[arg(short, long)]
    filters: Option<PathBuf>,

    /// Tokenize the dataset with this tokenizer configuration (JSON) and
    /// save token windows instead of scores
    #[arg(short, long)]
    tokenize: Option<PathBuf>,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let filters = if let Some(path) = &args.filters {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter config: {}", path.display()))?;
        serde_json::from_str::<FilterConfig>(&text)
            .with_context(|| format!("Failed to parse filter config: {}", path.display()))?
    } else {
        FilterConfig::default()
    };

    let dataset = ScoreDataset::build(&args.dir, args.recur, &filters)
        .with_context(|| format!("Failed to index {}", args.dir.display()))?;

    if !args.quiet {
        eprintln!("Indexed {} score(s) from {}", dataset.len(), args.dir.display());
    }

    if let Some(path) = &args.tokenize {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tokenizer config: {}", path.display()))?;
        let config = serde_json::from_str::<TokenizerConfig>(&text)
            .with_context(|| format!("Failed to parse tokenizer config: {}", path.display()))?;
        let tokenizer =
            EventTokenizer::new(config).context("Invalid tokenizer configuration")?;

        let tokenized = TokenizedDataset::build(&dataset, &tokenizer);
        tokenized
            .save(&args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;

        if !args.quiet {
            eprintln!(
                "Saved {} token window(s) to {}",
                tokenized.len(),
                args.output.display()
            );
        }
    } else {
        dataset
            .save(&args.output)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;

        if !args.quiet {
            eprintln!("Saved dataset to {}", args.output.display());
        }
    }

    Ok(())
}
