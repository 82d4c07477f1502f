//! Tokenizer configuration
//!
//! The configuration is declarative: it enumerates the quantization grids,
//! the instrument classes to drop, and the windowing policy. Validation is
//! fatal at construction, never silently coerced.

use serde::{Deserialize, Serialize};
use toccata_midi::Instrument;

use crate::error::ConfigError;

/// Windowing policy applied to the raw token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncate {
    /// Single window, the full sequence.
    None,
    /// Single window cut (or padded) to exactly `max_seq_len` tokens.
    Default,
    /// Overlapping fixed-length windows advancing by `stride_len`.
    Strided,
}

/// Time bucket grid: `num_steps` multiples of `min_step` milliseconds,
/// starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeQuantization {
    pub num_steps: u32,
    pub min_step: u32,
}

impl Default for TimeQuantization {
    fn default() -> Self {
        TimeQuantization {
            num_steps: 500,
            min_step: 10,
        }
    }
}

/// Velocity bucket grid: multiples of `step` up to 127.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityQuantization {
    pub step: u8,
}

impl Default for VelocityQuantization {
    fn default() -> Self {
        VelocityQuantization { step: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Right-pad short windows with the pad token.
    pub padding: bool,
    pub truncate: Truncate,
    pub max_seq_len: usize,
    /// Window advance, required when `truncate` is strided.
    pub stride_len: Option<usize>,
    /// Output-container hint for downstream model tooling; has no effect on
    /// token semantics.
    pub return_tensors: bool,
    pub time_quantization: TimeQuantization,
    pub velocity_quantization: VelocityQuantization,
    /// Instrument classes whose channels are dropped before tokenization.
    pub ignore_instruments: Vec<Instrument>,
    /// Velocity assigned to drum notes on decode.
    pub drum_velocity: u8,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            padding: false,
            truncate: Truncate::None,
            max_seq_len: 2048,
            stride_len: None,
            return_tensors: false,
            time_quantization: TimeQuantization::default(),
            velocity_quantization: VelocityQuantization::default(),
            ignore_instruments: Vec::new(),
            drum_velocity: 60,
        }
    }
}

impl TokenizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_seq_len == 0 {
            return Err(ConfigError::ZeroMaxSeqLen);
        }
        if self.truncate == Truncate::Strided {
            let stride_len = self.stride_len.ok_or(ConfigError::MissingStrideLen)?;
            if stride_len == 0 || stride_len >= self.max_seq_len {
                return Err(ConfigError::StrideLenOutOfRange {
                    stride_len,
                    max_seq_len: self.max_seq_len,
                });
            }
        }
        if self.velocity_quantization.step == 0 || self.velocity_quantization.step > 127 {
            return Err(ConfigError::InvalidVelocityStep(
                self.velocity_quantization.step,
            ));
        }
        if self.time_quantization.num_steps == 0 || self.time_quantization.min_step == 0 {
            return Err(ConfigError::InvalidTimeQuantization);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TokenizerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_strided_requires_stride_len() {
        let config = TokenizerConfig {
            truncate: Truncate::Strided,
            ..TokenizerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingStrideLen));
    }

    #[test]
    fn test_stride_len_must_be_below_max_seq_len() {
        let config = TokenizerConfig {
            truncate: Truncate::Strided,
            max_seq_len: 64,
            stride_len: Some(64),
            ..TokenizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StrideLenOutOfRange {
                stride_len: 64,
                max_seq_len: 64,
            })
        );

        let config = TokenizerConfig {
            truncate: Truncate::Strided,
            max_seq_len: 64,
            stride_len: Some(0),
            ..TokenizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_seq_len_rejected() {
        let config = TokenizerConfig {
            max_seq_len: 0,
            ..TokenizerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxSeqLen));
    }

    #[test]
    fn test_parse_from_json() {
        let config: TokenizerConfig = serde_json::from_str(
            r#"{
                "padding": true,
                "truncate": "strided",
                "max_seq_len": 512,
                "stride_len": 128,
                "ignore_instruments": ["sfx", "percussive"]
            }"#,
        )
        .unwrap();

        assert!(config.padding);
        assert_eq!(config.truncate, Truncate::Strided);
        assert_eq!(config.stride_len, Some(128));
        assert_eq!(
            config.ignore_instruments,
            vec![Instrument::Sfx, Instrument::Percussive]
        );
        // Unspecified sections keep their defaults
        assert_eq!(config.time_quantization.num_steps, 500);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_invalid_truncate_rejected_at_parse() {
        let res: Result<TokenizerConfig, _> =
            serde_json::from_str(r#"{"truncate": "sideways"}"#);
        assert!(res.is_err());
    }
}
