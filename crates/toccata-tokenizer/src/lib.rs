//! MIDI event-stream tokenization for sequence modeling
//!
//! This crate turns a normalized symbolic-music event stream
//! ([`toccata_midi::Score`]) into a discrete token sequence and back. Notes
//! become (voice, pitch, velocity-bucket) tokens followed by a quantized
//! duration; the silence between note onsets becomes wait tokens; the whole
//! sequence is framed by an instrument-name prefix and bos/eos markers, then
//! cut into model-input windows by the configured truncation policy.
//!
//! # Examples
//!
//! ```no_run
//! use toccata_midi::Score;
//! use toccata_tokenizer::{EventTokenizer, Tokenizer, TokenizerConfig};
//!
//! let score = Score::from_file("song.mid".as_ref()).unwrap();
//! let tokenizer = EventTokenizer::new(TokenizerConfig::default()).unwrap();
//!
//! let windows = tokenizer.tokenize(&score).unwrap();
//! let ids = tokenizer.encode_ids(&windows[0]);
//! ```
//!
//! # Main Components
//!
//! - **Token / Vocab**: the token set and its bijective id mapping
//! - **EventTokenizer**: the concrete encode/decode scheme
//! - **Quantizer**: time and velocity bucket ladders
//! - **PitchAug / VelocityAug**: randomized training-time transforms

pub mod augment;
pub mod config;
pub mod decode;
pub mod error;
pub mod pedal;
pub mod quantize;
pub mod time;
pub mod tokenizer;
pub mod vocab;
mod window;

pub use augment::{PitchAug, VelocityAug};
pub use config::{TimeQuantization, TokenizerConfig, Truncate, VelocityQuantization};
pub use error::{ConfigError, Result, TokenizeError};
pub use quantize::Quantizer;
pub use tokenizer::{EventTokenizer, DRUM_CHANNELS};
pub use vocab::{Special, Token, Vocab, Voice};

// Re-exported so downstream crates see one coherent surface
pub use toccata_midi::{Instrument, Score};

/// A tokenization scheme over normalized event streams.
///
/// Token-to-id mapping is shared behavior and total in both directions;
/// unknown tokens and ids degrade to the unknown marker instead of failing.
pub trait Tokenizer {
    fn vocab(&self) -> &Vocab;

    fn config(&self) -> &TokenizerConfig;

    /// Tokenize a score into one or more windows, per the configured
    /// truncation policy.
    fn tokenize(&self, score: &Score) -> std::result::Result<Vec<Vec<Token>>, TokenizeError>;

    /// Reconstruct an event stream from a token sequence.
    fn detokenize(&self, tokens: &[Token]) -> std::result::Result<Score, TokenizeError>;

    fn encode_ids(&self, tokens: &[Token]) -> Vec<u32> {
        self.vocab().encode_ids(tokens)
    }

    fn decode_ids(&self, ids: &[u32]) -> Vec<Token> {
        self.vocab().decode_ids(ids)
    }
}
