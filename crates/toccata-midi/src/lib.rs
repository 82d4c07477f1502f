//! Normalized symbolic-music event model
//!
//! This crate provides the event representation shared by the tokenizer and
//! dataset tooling: tick-stamped note, pedal, instrument, and tempo events
//! collected into a [`Score`], plus a loader that parses raw MIDI bytes into
//! that representation.
//!
//! # Examples
//!
//! ```no_run
//! use toccata_midi::Score;
//!
//! let score = Score::from_file("song.mid".as_ref()).unwrap();
//! println!("{} notes", score.notes.len());
//! ```

pub mod event;
pub mod instrument;
pub mod load;

pub use event::{InstrumentEvent, NoteEvent, PedalEvent, Score, TempoEvent, DEFAULT_TEMPO};
pub use instrument::Instrument;
pub use load::ScoreError;
