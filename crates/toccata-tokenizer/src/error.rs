use crate::vocab::Voice;

/// Fatal configuration problems, raised at tokenizer construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_seq_len must be greater than zero")]
    ZeroMaxSeqLen,

    #[error("stride_len is required when truncate is strided")]
    MissingStrideLen,

    #[error("stride_len must satisfy 0 < stride_len < max_seq_len, got {stride_len} with max_seq_len {max_seq_len}")]
    StrideLenOutOfRange {
        stride_len: usize,
        max_seq_len: usize,
    },

    #[error("velocity step must be between 1 and 127, got {0}")]
    InvalidVelocityStep(u8),

    #[error("time quantization needs at least one step of non-zero width")]
    InvalidTimeQuantization,
}

/// Errors raised while tokenizing or detokenizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("score contains no note events")]
    EmptySequence,

    #[error("duplicate instrument declaration in token sequence: {0}")]
    DuplicateInstrument(Voice),
}

pub type Result<T> = std::result::Result<T, TokenizeError>;
