//! The event tokenizer: MIDI event streams to token windows and back.

use std::collections::{HashMap, HashSet};
use toccata_midi::{Instrument, InstrumentEvent, NoteEvent, PedalEvent, Score};

use crate::augment::{PitchAug, VelocityAug};
use crate::config::TokenizerConfig;
use crate::decode;
use crate::error::{ConfigError, TokenizeError};
use crate::pedal::pedal_intervals;
use crate::quantize::Quantizer;
use crate::time::duration_ms;
use crate::vocab::{Special, Token, Vocab, Voice};
use crate::window;
use crate::Tokenizer;

/// Channel identifiers treated as the drum kit. 16 sits outside the 0-15
/// wire range but is kept as a reserved identifier; do not narrow this set
/// without checking the event streams it was built for.
pub const DRUM_CHANNELS: [u8; 2] = [9, 16];

/// Tokenizes notes as (voice, pitch, velocity-bucket) + duration pairs with
/// wait tokens for the gaps between note onsets.
///
/// The vocabulary and quantization ladders are built once at construction
/// and never mutated, so one instance can serve concurrent encode/decode
/// calls.
pub struct EventTokenizer {
    config: TokenizerConfig,
    quantizer: Quantizer,
    vocab: Vocab,
    /// Resolved stride; 0 unless `truncate` is strided.
    stride_len: usize,
}

impl EventTokenizer {
    pub fn new(config: TokenizerConfig) -> Result<EventTokenizer, ConfigError> {
        config.validate()?;

        let quantizer = Quantizer::new(&config);

        let voices: Vec<Voice> = Instrument::ALL
            .iter()
            .filter(|inst| !config.ignore_instruments.contains(inst))
            .map(|&inst| Voice::Melodic(inst))
            .chain([Voice::Drums])
            .collect();

        let vocab = Vocab::build(&voices, quantizer.velocity_steps(), quantizer.time_steps());
        let stride_len = config.stride_len.unwrap_or(0);

        Ok(EventTokenizer {
            config,
            quantizer,
            vocab,
            stride_len,
        })
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Pitch transform drawing one offset in `[-range, range]` per call.
    pub fn export_pitch_aug(&self, range: u8) -> PitchAug {
        PitchAug::new(range)
    }

    /// Velocity transform drawing one offset of up to `steps` velocity
    /// buckets per call, clamped to the audible bucket range.
    pub fn export_velocity_aug(&self, steps: u8) -> VelocityAug {
        VelocityAug::new(steps, self.quantizer.velocity_step, self.quantizer.max_velocity)
    }

    /// Channels whose declared program belongs to an ignored instrument
    /// class. Program 0 is never part of the removal set, and the reserved
    /// drum channels are always kept.
    fn removed_channels(&self, instruments: &[InstrumentEvent]) -> HashSet<u8> {
        let mut channels: HashSet<u8> = instruments
            .iter()
            .filter(|msg| {
                msg.program >= 1
                    && self
                        .config
                        .ignore_instruments
                        .contains(&Instrument::from_program(msg.program))
            })
            .map(|msg| msg.channel)
            .collect();

        for drum in DRUM_CHANNELS {
            channels.remove(&drum);
        }
        channels
    }

    /// Ordered, de-duplicated instrument-name prefix for the filtered
    /// stream: melodic declarations in first-seen order, then the drum
    /// marker when any drum-channel event is present.
    fn present_voices(&self, instruments: &[InstrumentEvent], notes: &[NoteEvent]) -> Vec<Token> {
        let mut prefix = Vec::new();
        let mut seen = HashSet::new();

        for msg in instruments {
            if DRUM_CHANNELS.contains(&msg.channel) {
                continue;
            }
            let voice = Voice::Melodic(Instrument::from_program(msg.program));
            if seen.insert(voice) {
                prefix.push(Token::Instrument(voice));
            }
        }

        let has_drums = instruments
            .iter()
            .any(|msg| DRUM_CHANNELS.contains(&msg.channel))
            || notes.iter().any(|n| DRUM_CHANNELS.contains(&n.channel));
        if has_drums && seen.insert(Voice::Drums) {
            prefix.push(Token::Instrument(Voice::Drums));
        }

        prefix
    }
}

impl Tokenizer for EventTokenizer {
    fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    fn tokenize(&self, score: &Score) -> Result<Vec<Vec<Token>>, TokenizeError> {
        if score.notes.is_empty() {
            return Err(TokenizeError::EmptySequence);
        }

        // 1. Drop every event on a removed channel
        let removed = self.removed_channels(&score.instruments);
        let notes: Vec<NoteEvent> = score
            .notes
            .iter()
            .filter(|n| !removed.contains(&n.channel))
            .copied()
            .collect();
        let pedals: Vec<PedalEvent> = score
            .pedals
            .iter()
            .filter(|p| !removed.contains(&p.channel))
            .copied()
            .collect();
        let instruments: Vec<InstrumentEvent> = score
            .instruments
            .iter()
            .filter(|m| !removed.contains(&m.channel))
            .copied()
            .collect();

        // 2. Channel resolution and the instrument-name prefix. The last
        // declaration on a channel wins.
        let mut channel_to_instrument: HashMap<u8, Instrument> = HashMap::new();
        for msg in &instruments {
            if !DRUM_CHANNELS.contains(&msg.channel) {
                channel_to_instrument.insert(msg.channel, Instrument::from_program(msg.program));
            }
        }
        let prefix = self.present_voices(&instruments, &notes);

        // 3. Pedal intervals over the filtered stream
        let final_tick = notes.iter().map(|n| n.end).max().unwrap_or(0);
        let intervals = pedal_intervals(&pedals, final_tick);

        // 4/5. Per-note tokens with wait gaps between consecutive onsets.
        // Leading silence is dropped implicitly.
        let no_intervals: Vec<(u32, u32)> = Vec::new();
        let mut body: Vec<Token> = Vec::new();

        for (i, note) in notes.iter().enumerate() {
            if DRUM_CHANNELS.contains(&note.channel) {
                body.push(Token::Drum { pitch: note.pitch });
            } else {
                let instrument = channel_to_instrument
                    .get(&note.channel)
                    .copied()
                    .unwrap_or(Instrument::Piano);

                // A held pedal extends the note to the interval's end
                let mut end_tick = note.end;
                for &(pedal_start, pedal_end) in
                    intervals.get(&note.channel).unwrap_or(&no_intervals)
                {
                    if pedal_start <= note.start && note.start < pedal_end && end_tick < pedal_end
                    {
                        end_tick = pedal_end;
                    }
                }

                let raw_ms =
                    duration_ms(note.start, end_tick, &score.tempos, score.ticks_per_beat);
                let velocity = self.quantizer.quantize_velocity(note.velocity);
                let mut ms = self.quantizer.quantize_time(raw_ms);
                if ms == 0 {
                    ms = self.quantizer.min_time_step;
                }

                body.push(Token::Note {
                    voice: Voice::Melodic(instrument),
                    pitch: note.pitch,
                    velocity,
                });
                body.push(Token::Duration { ms });
            }

            if let Some(next) = notes.get(i + 1) {
                let mut gap =
                    duration_ms(note.start, next.start, &score.tempos, score.ticks_per_beat);

                // Gaps beyond the ladder split into repeated max-bucket waits
                while gap > self.quantizer.max_time_step {
                    body.push(Token::Wait {
                        ms: self.quantizer.max_time_step,
                    });
                    gap -= self.quantizer.max_time_step;
                }

                let gap = self.quantizer.quantize_time(gap);
                if gap != 0 {
                    body.push(Token::Wait { ms: gap });
                }
            }
        }

        // 6. Frame and window
        let mut framed = Vec::with_capacity(body.len() + 2);
        framed.push(Token::Special(Special::Bos));
        framed.extend(body);
        framed.push(Token::Special(Special::Eos));

        Ok(window::apply(
            &prefix,
            framed,
            self.config.truncate,
            self.config.max_seq_len,
            self.stride_len,
            self.config.padding,
        ))
    }

    fn detokenize(&self, tokens: &[Token]) -> Result<Score, TokenizeError> {
        decode::detokenize(
            tokens,
            self.quantizer.min_time_step,
            self.config.drum_velocity,
        )
    }
}
