use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported digest length: {0} bytes (expected 20 or 32)")]
    UnsupportedDigestLength(usize),

    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}
