use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use toccata_midi::Score;
use toccata_tokenizer::{EventTokenizer, Tokenizer, TokenizerConfig, Truncate};

#[derive(Parser, Debug)]
#[command(name = "toccata")]
#[command(about = "Tokenize MIDI files into model-ready token windows", long_about = None)]
struct Args {
    /// Path to the MIDI file (default: uses first .mid file in current directory)
    #[arg(short, long)]
    midi: Option<PathBuf>,

    /// Output file path (default: `<midi-name>.tokens.json`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of file
    #[arg(long)]
    stdout: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// Tokenizer configuration file (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Windowing policy
    #[arg(short, long, value_enum)]
    truncate: Option<TruncateArg>,

    /// Window length in tokens
    #[arg(long)]
    max_seq_len: Option<usize>,

    /// Window advance for strided truncation
    #[arg(long)]
    stride_len: Option<usize>,

    /// Right-pad short windows with the pad token
    #[arg(short, long)]
    padding: bool,

    /// Emit integer ids instead of token text
    #[arg(long)]
    ids: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TruncateArg {
    None,
    Default,
    Strided,
}

impl From<TruncateArg> for Truncate {
    fn from(arg: TruncateArg) -> Truncate {
        match arg {
            TruncateArg::None => Truncate::None,
            TruncateArg::Default => Truncate::Default,
            TruncateArg::Strided => Truncate::Strided,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let midi_path = if let Some(path) = args.midi {
        if !path.exists() {
            anyhow::bail!("MIDI file not found: {}", path.display());
        }
        path
    } else {
        find_first_midi_file()?
    };

    let output_path = if let Some(path) = args.output {
        path
    } else {
        let stem = midi_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        PathBuf::from(format!("{}.tokens.json", stem))
    };

    if !args.quiet {
        eprintln!("Processing MIDI file: {}", midi_path.display());
    }

    let mut config = if let Some(path) = &args.config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str::<TokenizerConfig>(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?
    } else {
        TokenizerConfig::default()
    };

    // Command line flags override the config file
    if let Some(truncate) = args.truncate {
        config.truncate = truncate.into();
    }
    if let Some(max_seq_len) = args.max_seq_len {
        config.max_seq_len = max_seq_len;
    }
    if let Some(stride_len) = args.stride_len {
        config.stride_len = Some(stride_len);
    }
    if args.padding {
        config.padding = true;
    }
    let emit_ids = args.ids || config.return_tensors;

    let tokenizer = EventTokenizer::new(config).context("Invalid tokenizer configuration")?;

    let score = Score::from_file(&midi_path)?;
    let windows = tokenizer
        .tokenize(&score)
        .with_context(|| format!("Failed to tokenize {}", midi_path.display()))?;

    if !args.quiet {
        eprintln!(
            "{} window(s), vocabulary size {}",
            windows.len(),
            tokenizer.vocab().size()
        );
    }

    let output = if emit_ids {
        let ids: Vec<Vec<u32>> = windows.iter().map(|w| tokenizer.encode_ids(w)).collect();
        serde_json::to_string(&ids)?
    } else {
        let text: Vec<Vec<String>> = windows
            .iter()
            .map(|w| w.iter().map(|t| t.to_string()).collect())
            .collect();
        serde_json::to_string(&text)?
    };

    if args.stdout {
        println!("{}", output);
    } else {
        fs::write(&output_path, format!("{}\n", output))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        if !args.quiet {
            eprintln!("Output saved to {}", output_path.display());
        }
    }

    Ok(())
}

fn find_first_midi_file() -> Result<PathBuf> {
    let entries = fs::read_dir(".").context("Failed to read current directory")?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) == Some("mid") {
            return Ok(path);
        }
    }

    anyhow::bail!("No MIDI files found in current directory")
}
