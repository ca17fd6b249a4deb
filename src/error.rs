//! Errors reported by the analysis pipeline.

use thiserror::Error;

/// Errors raised by the pipeline.
///
/// All variants but [`Error::NonFinite`] abort a run before any window is
/// processed. [`Error::NonFinite`] only concerns a single window: the
/// analysis drivers log it and move on to the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input was not a single-channel sample sequence.
    #[error("invalid input shape: expected 1 channel, got {channels}")]
    InvalidShape { channels: usize },

    /// The input contained no samples.
    #[error("input buffer is empty")]
    EmptyInput,

    /// The buffer was recorded at a different rate than the detector was built for.
    #[error("sample rate mismatch: configured for {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: usize, actual: usize },

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A detector was handed a window of the wrong length.
    #[error("window has {actual} samples, detector expects {expected}")]
    WindowLength { expected: usize, actual: usize },

    /// A window held NaN or infinite samples, or its spectrum overflowed.
    #[error("non-finite values in {stage}")]
    NonFinite { stage: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
