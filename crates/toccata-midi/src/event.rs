use serde::{Deserialize, Serialize};

/// Fallback tempo in microseconds per quarter note (120 BPM).
pub const DEFAULT_TEMPO: u32 = 500_000;

/// A note with absolute start and end ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    pub start: u32,
    pub end: u32,
}

/// A sustain pedal state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedalEvent {
    pub channel: u8,
    pub tick: u32,
    pub down: bool,
}

/// A program (instrument) declaration on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentEvent {
    pub channel: u8,
    pub tick: u32,
    pub program: u8,
}

/// A tempo change, in microseconds per quarter note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoEvent {
    pub tick: u32,
    pub tempo: u32,
}

/// A normalized event stream for one piece: all events carry absolute ticks
/// relative to `ticks_per_beat`, and every list is ordered by tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub ticks_per_beat: u32,
    pub tempos: Vec<TempoEvent>,
    pub instruments: Vec<InstrumentEvent>,
    pub pedals: Vec<PedalEvent>,
    pub notes: Vec<NoteEvent>,
}

impl Score {
    /// Latest end tick over all notes, 0 for an empty score.
    pub fn final_tick(&self) -> u32 {
        self.notes.iter().map(|n| n.end).max().unwrap_or(0)
    }

    /// True when the score contains no note events.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
