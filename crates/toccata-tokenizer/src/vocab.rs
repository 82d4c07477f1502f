//! Token vocabulary
//!
//! The vocabulary is derived once from configuration and shared read-only by
//! every encode/decode call. Ordering is deterministic: special tokens,
//! instrument names, the full (voice x pitch x velocity bucket) cross
//! product, drum pitches, then wait buckets ascending. Id mapping is total
//! in both directions: anything unknown degrades to the unknown token.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use toccata_midi::Instrument;

/// Inclusive General MIDI percussion pitch range covered by drum tokens.
pub const DRUM_PITCH_MIN: u8 = 35;
pub const DRUM_PITCH_MAX: u8 = 81;

/// Sequence control tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    Bos,
    Eos,
    Pad,
    Unk,
}

impl Special {
    pub const ALL: [Special; 4] = [Special::Bos, Special::Eos, Special::Pad, Special::Unk];

    pub fn as_str(self) -> &'static str {
        match self {
            Special::Bos => "<S>",
            Special::Eos => "<E>",
            Special::Pad => "<P>",
            Special::Unk => "<U>",
        }
    }
}

/// An instrument voice as it appears in the vocabulary: a melodic General
/// MIDI class, or the drum kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Melodic(Instrument),
    Drums,
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Voice::Melodic(inst) => f.write_str(inst.name()),
            Voice::Drums => f.write_str("drums"),
        }
    }
}

/// One vocabulary entry. Tokens are immutable values with structural
/// equality; millisecond fields always hold a quantization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Special(Special),
    Instrument(Voice),
    Note { voice: Voice, pitch: u8, velocity: u8 },
    Drum { pitch: u8 },
    Duration { ms: u32 },
    Wait { ms: u32 },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Special(s) => f.write_str(s.as_str()),
            Token::Instrument(v) => write!(f, "{}", v),
            Token::Note { voice, pitch, velocity } => {
                write!(f, "{}:{}:{}", voice, pitch, velocity)
            }
            Token::Drum { pitch } => write!(f, "drum:{}", pitch),
            Token::Duration { ms } => write!(f, "dur:{}", ms),
            Token::Wait { ms } => write!(f, "wait:{}", ms),
        }
    }
}

/// Bijective token <-> id mapping, built once per tokenizer instance.
#[derive(Debug, Clone)]
pub struct Vocab {
    tokens: Vec<Token>,
    ids: HashMap<Token, u32>,
}

impl Vocab {
    pub(crate) fn build(voices: &[Voice], velocity_steps: &[u8], time_steps: &[u32]) -> Vocab {
        let mut tokens = Vec::new();

        for special in Special::ALL {
            tokens.push(Token::Special(special));
        }
        for &voice in voices {
            tokens.push(Token::Instrument(voice));
        }
        for &voice in voices {
            for pitch in 0..=127u8 {
                for &velocity in velocity_steps {
                    tokens.push(Token::Note { voice, pitch, velocity });
                }
            }
        }
        for pitch in DRUM_PITCH_MIN..=DRUM_PITCH_MAX {
            tokens.push(Token::Drum { pitch });
        }
        for &ms in time_steps {
            tokens.push(Token::Wait { ms });
        }

        let ids = tokens
            .iter()
            .enumerate()
            .map(|(id, &tok)| (tok, id as u32))
            .collect();

        Vocab { tokens, ids }
    }

    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Id for a token; unknown tokens map to the unknown id.
    pub fn id(&self, token: Token) -> u32 {
        self.ids
            .get(&token)
            .copied()
            .unwrap_or_else(|| self.unk_id())
    }

    /// Token for an id; out-of-range ids map to the unknown token.
    pub fn token(&self, id: u32) -> Token {
        self.tokens
            .get(id as usize)
            .copied()
            .unwrap_or(Token::Special(Special::Unk))
    }

    pub fn encode_ids(&self, tokens: &[Token]) -> Vec<u32> {
        tokens.iter().map(|&tok| self.id(tok)).collect()
    }

    pub fn decode_ids(&self, ids: &[u32]) -> Vec<Token> {
        ids.iter().map(|&id| self.token(id)).collect()
    }

    pub fn bos_id(&self) -> u32 {
        0
    }

    pub fn eos_id(&self) -> u32 {
        1
    }

    pub fn pad_id(&self) -> u32 {
        2
    }

    pub fn unk_id(&self) -> u32 {
        3
    }

    /// Tokens in id order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vocab() -> Vocab {
        let voices: Vec<Voice> = Instrument::ALL
            .iter()
            .map(|&i| Voice::Melodic(i))
            .chain([Voice::Drums])
            .collect();
        let velocity_steps: Vec<u8> = (0..=12).map(|i| i * 10).collect();
        let time_steps: Vec<u32> = (0..500).map(|i| i * 10).collect();
        Vocab::build(&voices, &velocity_steps, &time_steps)
    }

    #[test]
    fn test_size_formula() {
        let vocab = test_vocab();
        // specials + names + voices*pitches*velocities + drums + waits
        assert_eq!(vocab.size(), 4 + 17 + 17 * 128 * 13 + 47 + 500);
    }

    #[test]
    fn test_ordering() {
        let vocab = test_vocab();
        assert_eq!(vocab.token(0), Token::Special(Special::Bos));
        assert_eq!(vocab.token(3), Token::Special(Special::Unk));
        assert_eq!(
            vocab.token(4),
            Token::Instrument(Voice::Melodic(Instrument::Piano))
        );
        // First note token follows the 17 instrument names
        assert_eq!(
            vocab.token(4 + 17),
            Token::Note {
                voice: Voice::Melodic(Instrument::Piano),
                pitch: 0,
                velocity: 0,
            }
        );
    }

    #[test]
    fn test_round_trip_ids() {
        let vocab = test_vocab();
        for (id, &tok) in vocab.tokens().iter().enumerate() {
            assert_eq!(vocab.id(tok), id as u32);
            assert_eq!(vocab.token(id as u32), tok);
        }
    }

    #[test]
    fn test_unknown_token_maps_to_unk_id() {
        let vocab = test_vocab();
        // Velocity 7 is not a bucket, so this token is out of vocabulary
        let tok = Token::Note {
            voice: Voice::Melodic(Instrument::Piano),
            pitch: 60,
            velocity: 7,
        };
        assert_eq!(vocab.id(tok), vocab.unk_id());

        // Duration tokens are not part of the vocabulary
        assert_eq!(vocab.id(Token::Duration { ms: 100 }), vocab.unk_id());
    }

    #[test]
    fn test_unknown_id_maps_to_unk_token() {
        let vocab = test_vocab();
        assert_eq!(
            vocab.token(u32::MAX),
            Token::Special(Special::Unk)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Special(Special::Bos).to_string(), "<S>");
        assert_eq!(
            Token::Instrument(Voice::Melodic(Instrument::SynthLead)).to_string(),
            "synth_lead"
        );
        assert_eq!(
            Token::Note {
                voice: Voice::Melodic(Instrument::Piano),
                pitch: 60,
                velocity: 90,
            }
            .to_string(),
            "piano:60:90"
        );
        assert_eq!(Token::Drum { pitch: 38 }.to_string(), "drum:38");
        assert_eq!(Token::Wait { ms: 120 }.to_string(), "wait:120");
    }
}
