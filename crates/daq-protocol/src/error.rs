//! Error types for host protocol parsing

use thiserror::Error;

/// Errors that can occur while parsing protocol lines
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Settings line has the wrong number of comma-separated fields
    #[error("wrong field count: expected {expected}, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// Enable flag is missing or not '0'/'1'
    #[error("invalid enable flag: {0:?}")]
    InvalidFlag(String),

    /// Sampling rate is not a positive decimal integer
    #[error("invalid sampling rate: {0:?}")]
    InvalidRate(String),

    /// Channel mask is empty or contains characters other than '0'/'1'
    #[error("invalid channel mask: {0:?}")]
    InvalidMask(String),

    /// Channel mask length does not match the catalog
    #[error("channel mask length mismatch: expected {expected}, got {actual}")]
    MaskLength { expected: usize, actual: usize },

    /// Info reply line does not match the reply grammar
    #[error("invalid info reply: {0:?}")]
    InvalidInfo(String),

    /// Sample line field is not a decimal number
    #[error("invalid sample value: {0:?}")]
    InvalidValue(String),
}
