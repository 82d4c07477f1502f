//! Dataset assembly for tokenizer training corpora
//!
//! Scans directories for MIDI files, parses each into a normalized
//! [`Score`], filters out degenerate files, and persists the survivors as
//! JSON. A second pass runs a tokenizer over a score dataset to produce the
//! flat window list consumed by model training. Per-file failures are
//! reported and skipped; they never abort a build.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use toccata_midi::Score;
use toccata_tokenizer::{Token, Tokenizer, Truncate};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accept/reject filters applied to each parsed score during a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Reject scores with fewer notes than this.
    pub min_notes: usize,
    /// Reject scores where one pitch accounts for more than this fraction
    /// of all notes (stuck or degenerate files).
    pub max_single_pitch_ratio: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            min_notes: 16,
            max_single_pitch_ratio: 0.9,
        }
    }
}

impl FilterConfig {
    /// Names of the checks a score fails, empty when it passes.
    pub fn failed_checks(&self, score: &Score) -> Vec<&'static str> {
        let mut failed = Vec::new();

        if score.notes.len() < self.min_notes {
            failed.push("min_notes");
        }

        if !score.notes.is_empty() {
            let mut counts = [0usize; 128];
            for note in &score.notes {
                counts[(note.pitch & 127) as usize] += 1;
            }
            let most_common = counts.iter().max().copied().unwrap_or(0);
            if most_common as f64 / score.notes.len() as f64 > self.max_single_pitch_ratio {
                failed.push("single_pitch_ratio");
            }
        }

        if score.tempos.is_empty() {
            failed.push("tempo_map");
        }

        failed
    }
}

/// A collection of parsed, filtered scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDataset {
    pub entries: Vec<Score>,
}

impl ScoreDataset {
    /// Scan `dir` for `.mid`/`.midi` files and build a dataset from every
    /// file that parses and passes the filters.
    pub fn build(dir: &Path, recur: bool, filters: &FilterConfig) -> Result<ScoreDataset, DatasetError> {
        let mut paths = Vec::new();
        collect_midi_paths(dir, recur, &mut paths)?;
        paths.sort();

        let mut entries = Vec::new();
        for path in paths {
            let score = match Score::from_file(&path) {
                Ok(score) => score,
                Err(e) => {
                    eprintln!("Failed to load {}: {}", path.display(), e);
                    continue;
                }
            };

            let failed = filters.failed_checks(&score);
            if failed.is_empty() {
                entries.push(score);
            } else {
                eprintln!("{} not added. Failed checks: {}.", path.display(), failed.join(", "));
            }
        }

        Ok(ScoreDataset { entries })
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let json = serde_json::to_string(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<ScoreDataset, DatasetError> {
        let text = fs::read_to_string(path)?;
        let entries = serde_json::from_str(&text)?;
        Ok(ScoreDataset { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Score> {
        self.entries.iter()
    }
}

/// A flat list of token windows, ready for id-encoding and batching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizedDataset {
    pub entries: Vec<Vec<Token>>,
}

impl TokenizedDataset {
    /// Tokenize every score in the dataset, flattening the windows. Scores
    /// the tokenizer rejects are reported and skipped.
    pub fn build<T: Tokenizer>(scores: &ScoreDataset, tokenizer: &T) -> TokenizedDataset {
        if tokenizer.config().truncate != Truncate::Strided {
            eprintln!("Tokenizer striding not being used when building dataset.");
        }

        let mut entries = Vec::new();
        for (idx, score) in scores.iter().enumerate() {
            match tokenizer.tokenize(score) {
                Ok(windows) => entries.extend(windows),
                Err(e) => eprintln!("Skipping entry {}: {}", idx, e),
            }
        }

        TokenizedDataset { entries }
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let json = serde_json::to_string(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<TokenizedDataset, DatasetError> {
        let text = fs::read_to_string(path)?;
        let entries = serde_json::from_str(&text)?;
        Ok(TokenizedDataset { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect_midi_paths(dir: &Path, recur: bool, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if recur {
                collect_midi_paths(&path, recur, out)?;
            }
            continue;
        }

        match path.extension().and_then(|s| s.to_str()) {
            Some("mid") | Some("midi") => out.push(path),
            _ => {}
        }
    }
    Ok(())
}
