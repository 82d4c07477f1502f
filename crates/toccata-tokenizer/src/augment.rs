//! Randomized token-sequence transforms for training-time augmentation.
//!
//! Each transform is a pure value parameterized at export time; every call
//! draws a fresh offset from the supplied random source, so seeded
//! generators give reproducible output.

use rand::Rng;

use crate::vocab::{Special, Token};

/// Shifts every note pitch by one uniformly drawn offset per call.
/// Shifted pitches outside 0-127 become the unknown token.
#[derive(Debug, Clone, Copy)]
pub struct PitchAug {
    range: u8,
}

impl PitchAug {
    pub(crate) fn new(range: u8) -> PitchAug {
        PitchAug { range }
    }

    pub fn apply<R: Rng + ?Sized>(&self, tokens: &[Token], rng: &mut R) -> Vec<Token> {
        let offset = rng.gen_range(-(self.range as i16)..=self.range as i16);

        tokens
            .iter()
            .map(|&token| match token {
                Token::Note { voice, pitch, velocity } => {
                    let shifted = pitch as i16 + offset;
                    if (0..=127).contains(&shifted) {
                        Token::Note {
                            voice,
                            pitch: shifted as u8,
                            velocity,
                        }
                    } else {
                        Token::Special(Special::Unk)
                    }
                }
                other => other,
            })
            .collect()
    }

    /// Convenience wrapper over the process-wide generator.
    pub fn apply_default(&self, tokens: &[Token]) -> Vec<Token> {
        self.apply(tokens, &mut rand::thread_rng())
    }
}

/// Shifts every note velocity by one drawn multiple of the velocity step
/// per call, clamped to the audible bucket range.
#[derive(Debug, Clone, Copy)]
pub struct VelocityAug {
    steps: u8,
    velocity_step: u8,
    max_velocity: u8,
}

impl VelocityAug {
    pub(crate) fn new(steps: u8, velocity_step: u8, max_velocity: u8) -> VelocityAug {
        VelocityAug {
            steps,
            velocity_step,
            max_velocity,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, tokens: &[Token], rng: &mut R) -> Vec<Token> {
        let offset = self.velocity_step as i16
            * rng.gen_range(-(self.steps as i16)..=self.steps as i16);

        tokens
            .iter()
            .map(|&token| match token {
                Token::Note { voice, pitch, velocity } => {
                    let shifted = velocity as i16 + offset;
                    let velocity = if shifted >= self.max_velocity as i16 {
                        self.max_velocity
                    } else if shifted <= self.velocity_step as i16 {
                        self.velocity_step
                    } else {
                        shifted as u8
                    };
                    Token::Note { voice, pitch, velocity }
                }
                other => other,
            })
            .collect()
    }

    /// Convenience wrapper over the process-wide generator.
    pub fn apply_default(&self, tokens: &[Token]) -> Vec<Token> {
        self.apply(tokens, &mut rand::thread_rng())
    }
}
