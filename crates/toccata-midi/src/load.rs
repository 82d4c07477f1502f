//! MIDI file parsing into the normalized [`Score`] representation.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::path::Path;

use crate::event::{InstrumentEvent, NoteEvent, PedalEvent, Score, TempoEvent, DEFAULT_TEMPO};

/// Sustain pedal controller number.
const CC_SUSTAIN: u8 = 64;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("failed to read MIDI file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse MIDI file: {0}")]
    Midi(#[from] midly::Error),
}

impl Score {
    pub fn from_file(path: &Path) -> Result<Self, ScoreError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse standard MIDI file bytes, accumulating absolute ticks per track.
    ///
    /// Note-on events with velocity 0 are treated as note-offs; notes left
    /// open at the end of a track close at the track's final tick. The tempo
    /// map is guaranteed non-empty and sorted.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScoreError> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int() as u32,
            Timing::Timecode(fps, subframe) => {
                // Approximate timecode resolution as ticks per beat
                (fps.as_f32() * subframe as f32 * 4.0) as u32
            }
        };

        let mut tempos = Vec::new();
        let mut instruments = Vec::new();
        let mut pedals = Vec::new();
        let mut notes = Vec::new();

        for track in &smf.tracks {
            let mut tick: u32 = 0;
            // (channel, pitch) -> (start tick, velocity)
            let mut open: HashMap<(u8, u8), (u32, u8)> = HashMap::new();

            for event in track {
                tick += event.delta.as_int();

                match event.kind {
                    TrackEventKind::Midi { channel, message } => {
                        let channel = channel.as_int();
                        match message {
                            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                                let pitch = key.as_int();
                                // A re-struck pitch closes the previous note
                                if let Some((start, velocity)) =
                                    open.insert((channel, pitch), (tick, vel.as_int()))
                                {
                                    notes.push(NoteEvent {
                                        channel,
                                        pitch,
                                        velocity,
                                        start,
                                        end: tick,
                                    });
                                }
                            }
                            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                                let pitch = key.as_int();
                                if let Some((start, velocity)) = open.remove(&(channel, pitch)) {
                                    notes.push(NoteEvent {
                                        channel,
                                        pitch,
                                        velocity,
                                        start,
                                        end: tick,
                                    });
                                }
                            }
                            MidiMessage::Controller { controller, value }
                                if controller.as_int() == CC_SUSTAIN =>
                            {
                                pedals.push(PedalEvent {
                                    channel,
                                    tick,
                                    down: value.as_int() >= 64,
                                });
                            }
                            MidiMessage::ProgramChange { program } => {
                                instruments.push(InstrumentEvent {
                                    channel,
                                    tick,
                                    program: program.as_int(),
                                });
                            }
                            _ => {}
                        }
                    }
                    TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                        tempos.push(TempoEvent {
                            tick,
                            tempo: tempo.as_int(),
                        });
                    }
                    _ => {}
                }
            }

            // Close unterminated notes at the track's final tick
            for ((channel, pitch), (start, velocity)) in open {
                if tick > start {
                    notes.push(NoteEvent {
                        channel,
                        pitch,
                        velocity,
                        start,
                        end: tick,
                    });
                }
            }
        }

        if tempos.is_empty() {
            tempos.push(TempoEvent {
                tick: 0,
                tempo: DEFAULT_TEMPO,
            });
        }

        tempos.sort_by_key(|t| t.tick);
        instruments.sort_by_key(|m| m.tick);
        pedals.sort_by_key(|p| p.tick);
        notes.sort_by_key(|n| (n.start, n.channel, n.pitch));

        Ok(Score {
            ticks_per_beat,
            tempos,
            instruments,
            pedals,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Header, TrackEvent};

    fn midi_event(delta: u32, channel: u8, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        }
    }

    fn test_smf() -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(480)),
        ));
        smf.tracks.push(vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000))),
            },
            midi_event(0, 0, MidiMessage::ProgramChange { program: u7::new(0) }),
            midi_event(
                0,
                0,
                MidiMessage::Controller {
                    controller: u7::new(64),
                    value: u7::new(127),
                },
            ),
            midi_event(
                0,
                0,
                MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(90),
                },
            ),
            midi_event(
                480,
                0,
                MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(0),
                },
            ),
            midi_event(
                0,
                0,
                MidiMessage::Controller {
                    controller: u7::new(64),
                    value: u7::new(0),
                },
            ),
            // Left open on purpose, closes at the final tick
            midi_event(
                0,
                9,
                MidiMessage::NoteOn {
                    key: u7::new(38),
                    vel: u7::new(100),
                },
            ),
            TrackEvent {
                delta: u28::new(240),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);
        smf
    }

    #[test]
    fn test_from_bytes_collects_events() {
        let mut bytes = Vec::new();
        test_smf().write_std(&mut bytes).unwrap();
        let score = Score::from_bytes(&bytes).unwrap();

        assert_eq!(score.ticks_per_beat, 480);
        assert_eq!(score.tempos, vec![TempoEvent { tick: 0, tempo: 500_000 }]);
        assert_eq!(
            score.instruments,
            vec![InstrumentEvent { channel: 0, tick: 0, program: 0 }]
        );
        assert_eq!(
            score.pedals,
            vec![
                PedalEvent { channel: 0, tick: 0, down: true },
                PedalEvent { channel: 0, tick: 480, down: false },
            ]
        );
        assert_eq!(
            score.notes,
            vec![
                NoteEvent { channel: 0, pitch: 60, velocity: 90, start: 0, end: 480 },
                NoteEvent { channel: 9, pitch: 38, velocity: 100, start: 480, end: 720 },
            ]
        );
    }

    #[test]
    fn test_missing_tempo_gets_default() {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(96)),
        ));
        smf.tracks.push(vec![
            midi_event(
                0,
                0,
                MidiMessage::NoteOn {
                    key: u7::new(64),
                    vel: u7::new(64),
                },
            ),
            midi_event(
                96,
                0,
                MidiMessage::NoteOff {
                    key: u7::new(64),
                    vel: u7::new(0),
                },
            ),
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);

        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();
        let score = Score::from_bytes(&bytes).unwrap();
        assert_eq!(score.tempos, vec![TempoEvent { tick: 0, tempo: DEFAULT_TEMPO }]);
        assert_eq!(score.notes.len(), 1);
    }

    #[test]
    fn test_zero_length_open_note_dropped() {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(u15::new(480)),
        ));
        // Note opens on the final tick of the track and never closes
        smf.tracks.push(vec![
            midi_event(
                0,
                0,
                MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(80),
                },
            ),
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]);

        let mut bytes = Vec::new();
        smf.write_std(&mut bytes).unwrap();
        let score = Score::from_bytes(&bytes).unwrap();
        assert!(score.notes.is_empty());
    }
}
