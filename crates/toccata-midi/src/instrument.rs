use serde::{Deserialize, Serialize};
use std::fmt;

/// General MIDI instrument class, one per bank of eight programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    Piano,
    Chromatic,
    Organ,
    Guitar,
    Bass,
    Strings,
    Ensemble,
    Brass,
    Reed,
    Pipe,
    SynthLead,
    SynthPad,
    SynthEffect,
    Ethnic,
    Percussive,
    Sfx,
}

impl Instrument {
    /// All classes in program order.
    pub const ALL: [Instrument; 16] = [
        Instrument::Piano,
        Instrument::Chromatic,
        Instrument::Organ,
        Instrument::Guitar,
        Instrument::Bass,
        Instrument::Strings,
        Instrument::Ensemble,
        Instrument::Brass,
        Instrument::Reed,
        Instrument::Pipe,
        Instrument::SynthLead,
        Instrument::SynthPad,
        Instrument::SynthEffect,
        Instrument::Ethnic,
        Instrument::Percussive,
        Instrument::Sfx,
    ];

    /// Map a MIDI program number (0-127) to its instrument class.
    pub fn from_program(program: u8) -> Instrument {
        match program {
            0..=7 => Instrument::Piano,
            8..=15 => Instrument::Chromatic,
            16..=23 => Instrument::Organ,
            24..=31 => Instrument::Guitar,
            32..=39 => Instrument::Bass,
            40..=47 => Instrument::Strings,
            48..=55 => Instrument::Ensemble,
            56..=63 => Instrument::Brass,
            64..=71 => Instrument::Reed,
            72..=79 => Instrument::Pipe,
            80..=87 => Instrument::SynthLead,
            88..=95 => Instrument::SynthPad,
            96..=103 => Instrument::SynthEffect,
            104..=111 => Instrument::Ethnic,
            112..=119 => Instrument::Percussive,
            120..=127 => Instrument::Sfx,

            // Programs are 7-bit on the wire
            _ => Instrument::Piano,
        }
    }

    /// Class name as it appears in configuration and token text.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Chromatic => "chromatic",
            Instrument::Organ => "organ",
            Instrument::Guitar => "guitar",
            Instrument::Bass => "bass",
            Instrument::Strings => "strings",
            Instrument::Ensemble => "ensemble",
            Instrument::Brass => "brass",
            Instrument::Reed => "reed",
            Instrument::Pipe => "pipe",
            Instrument::SynthLead => "synth_lead",
            Instrument::SynthPad => "synth_pad",
            Instrument::SynthEffect => "synth_effect",
            Instrument::Ethnic => "ethnic",
            Instrument::Percussive => "percussive",
            Instrument::Sfx => "sfx",
        }
    }

    /// Representative program for the class: the first program in its bank.
    pub fn program(self) -> u8 {
        match self {
            Instrument::Piano => 0,
            Instrument::Chromatic => 8,
            Instrument::Organ => 16,
            Instrument::Guitar => 24,
            Instrument::Bass => 32,
            Instrument::Strings => 40,
            Instrument::Ensemble => 48,
            Instrument::Brass => 56,
            Instrument::Reed => 64,
            Instrument::Pipe => 72,
            Instrument::SynthLead => 80,
            Instrument::SynthPad => 88,
            Instrument::SynthEffect => 96,
            Instrument::Ethnic => 104,
            Instrument::Percussive => 112,
            Instrument::Sfx => 120,
        }
    }

    /// Parse a class name, the inverse of [`Instrument::name`].
    pub fn from_name(name: &str) -> Option<Instrument> {
        Instrument::ALL.iter().copied().find(|i| i.name() == name)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
