//! Token sequences back to tick-accurate event streams.

use std::collections::HashMap;
use toccata_midi::{InstrumentEvent, NoteEvent, Score, TempoEvent};

use crate::error::TokenizeError;
use crate::time::ms_to_ticks;
use crate::tokenizer::DRUM_CHANNELS;
use crate::vocab::{Token, Voice};

/// Decoding does not attempt to recover the original tempo map; every
/// reconstructed score uses this fixed resolution and tempo.
pub const TICKS_PER_BEAT: u32 = 480;
pub const TEMPO: u32 = 500_000;

pub(crate) fn detokenize(
    tokens: &[Token],
    min_time_step: u32,
    drum_velocity: u8,
) -> Result<Score, TokenizeError> {
    let drum_channel = DRUM_CHANNELS[0];

    let mut instruments = vec![InstrumentEvent {
        channel: drum_channel,
        tick: 0,
        program: 1,
    }];
    let mut channel_of: HashMap<Voice, u8> = HashMap::from([(Voice::Drums, drum_channel)]);

    // Leading instrument names claim channels in first-seen order, skipping
    // the drum channel. The scan stops at the first body token.
    let mut next_channel: u8 = 0;
    let mut body_start = tokens.len();
    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::Instrument(voice @ Voice::Melodic(instrument)) => {
                if channel_of.contains_key(voice) {
                    return Err(TokenizeError::DuplicateInstrument(*voice));
                }
                if next_channel == drum_channel {
                    next_channel += 1;
                }
                instruments.push(InstrumentEvent {
                    channel: next_channel,
                    tick: 0,
                    program: instrument.program(),
                });
                channel_of.insert(*voice, next_channel);
                next_channel += 1;
            }
            Token::Special(_) | Token::Instrument(Voice::Drums) => continue,
            _ => {
                body_start = idx;
                break;
            }
        }
    }

    let mut notes = Vec::new();
    let mut curr_tick: u32 = 0;

    for pair in tokens[body_start..].windows(2) {
        let (curr, next) = (pair[0], pair[1]);
        match curr {
            Token::Special(_) | Token::Duration { .. } | Token::Instrument(_) => continue,
            Token::Wait { ms } => {
                curr_tick += ms_to_ticks(ms, TEMPO, TICKS_PER_BEAT);
            }
            Token::Drum { pitch } => {
                notes.push(NoteEvent {
                    channel: drum_channel,
                    pitch,
                    velocity: drum_velocity,
                    start: curr_tick,
                    end: curr_tick + min_time_step,
                });
            }
            Token::Note { voice, pitch, velocity } => {
                // A note not followed by its duration emits nothing
                if let Token::Duration { ms } = next {
                    if let Some(&channel) = channel_of.get(&voice) {
                        notes.push(NoteEvent {
                            channel,
                            pitch,
                            velocity,
                            start: curr_tick,
                            end: curr_tick + ms_to_ticks(ms, TEMPO, TICKS_PER_BEAT),
                        });
                    }
                }
            }
        }
    }

    Ok(Score {
        ticks_per_beat: TICKS_PER_BEAT,
        tempos: vec![TempoEvent { tick: 0, tempo: TEMPO }],
        instruments,
        pedals: Vec::new(),
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Special;
    use toccata_midi::Instrument;

    const PIANO: Voice = Voice::Melodic(Instrument::Piano);
    const STRINGS: Voice = Voice::Melodic(Instrument::Strings);

    fn decode(tokens: &[Token]) -> Score {
        match detokenize(tokens, 10, 60) {
            Ok(score) => score,
            Err(e) => panic!("detokenize failed: {}", e),
        }
    }

    #[test]
    fn test_channel_assignment_skips_drums() {
        let mut tokens: Vec<Token> = Vec::new();
        for inst in Instrument::ALL.iter().take(12) {
            tokens.push(Token::Instrument(Voice::Melodic(*inst)));
        }
        tokens.push(Token::Instrument(Voice::Drums));
        tokens.push(Token::Special(Special::Bos));
        tokens.push(Token::Special(Special::Eos));

        let score = decode(&tokens);
        let channels: Vec<u8> = score.instruments.iter().map(|m| m.channel).collect();
        // Drum declaration first, then melodic channels with 9 skipped
        assert_eq!(channels, vec![9, 0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12]);
    }

    #[test]
    fn test_duplicate_instrument_fails() {
        let tokens = vec![
            Token::Instrument(PIANO),
            Token::Instrument(STRINGS),
            Token::Instrument(PIANO),
        ];
        assert_eq!(
            detokenize(&tokens, 10, 60),
            Err(TokenizeError::DuplicateInstrument(PIANO))
        );
    }

    #[test]
    fn test_repeated_drum_marker_allowed() {
        let tokens = vec![
            Token::Instrument(Voice::Drums),
            Token::Instrument(Voice::Drums),
            Token::Special(Special::Bos),
            Token::Drum { pitch: 38 },
            Token::Special(Special::Eos),
        ];
        let score = decode(&tokens);
        assert_eq!(score.notes.len(), 1);
    }

    #[test]
    fn test_wait_advances_cursor() {
        let tokens = vec![
            Token::Instrument(PIANO),
            Token::Special(Special::Bos),
            Token::Note { voice: PIANO, pitch: 60, velocity: 90 },
            Token::Duration { ms: 500 },
            Token::Wait { ms: 500 },
            Token::Note { voice: PIANO, pitch: 64, velocity: 90 },
            Token::Duration { ms: 250 },
            Token::Special(Special::Eos),
        ];
        let score = decode(&tokens);
        assert_eq!(score.notes.len(), 2);

        // 500 ms at the fixed tempo is one beat of 480 ticks
        assert_eq!(score.notes[0].start, 0);
        assert_eq!(score.notes[0].end, 480);
        assert_eq!(score.notes[1].start, 480);
        assert_eq!(score.notes[1].end, 480 + 240);
        assert_eq!(score.notes[1].channel, 0);
    }

    #[test]
    fn test_drum_note_shape() {
        let tokens = vec![
            Token::Special(Special::Bos),
            Token::Drum { pitch: 42 },
            Token::Special(Special::Eos),
        ];
        let score = decode(&tokens);
        assert_eq!(
            score.notes,
            vec![NoteEvent {
                channel: 9,
                pitch: 42,
                velocity: 60,
                start: 0,
                end: 10,
            }]
        );
    }

    #[test]
    fn test_dangling_note_token_skipped() {
        let tokens = vec![
            Token::Instrument(PIANO),
            Token::Special(Special::Bos),
            // Wait follows instead of a duration
            Token::Note { voice: PIANO, pitch: 60, velocity: 90 },
            Token::Wait { ms: 100 },
            Token::Note { voice: PIANO, pitch: 64, velocity: 90 },
            Token::Duration { ms: 100 },
            Token::Special(Special::Eos),
        ];
        let score = decode(&tokens);
        assert_eq!(score.notes.len(), 1);
        assert_eq!(score.notes[0].pitch, 64);
    }

    #[test]
    fn test_unknown_voice_note_skipped() {
        // A note whose voice never appeared in the prefix has no channel
        let tokens = vec![
            Token::Special(Special::Bos),
            Token::Note { voice: STRINGS, pitch: 60, velocity: 90 },
            Token::Duration { ms: 100 },
            Token::Special(Special::Eos),
        ];
        let score = decode(&tokens);
        assert!(score.notes.is_empty());
    }

    #[test]
    fn test_fixed_tempo_map() {
        let score = decode(&[Token::Special(Special::Bos), Token::Special(Special::Eos)]);
        assert_eq!(score.ticks_per_beat, 480);
        assert_eq!(score.tempos, vec![TempoEvent { tick: 0, tempo: 500_000 }]);
        assert!(score.pedals.is_empty());
    }
}
