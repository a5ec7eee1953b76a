//! Error types for gait-cycle extraction.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GaitError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Insufficient intervals: need {required}, have {found}")]
    InsufficientIntervals { required: usize, found: usize },

    #[error("Interval ({start}, {end}) lies outside a channel of {len} samples")]
    IntervalOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Recording has no samples")]
    EmptyRecording,

    #[error("Shape mismatch: expected {expected} rows, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GaitError>;
