//! Error handling for the ECG pipeline
//!
//! Every fallible operation in the workspace returns [`EcgResult`]; the
//! services catch these at the per-file / per-message boundary and keep
//! running.

use core::fmt;

/// Result type alias for ECG pipeline operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error taxonomy for signal conditioning and messaging
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EcgError {
    /// A required input channel is absent from a signal block
    MissingChannel {
        /// Name of the missing channel
        channel: String,
    },

    /// Channel lengths disagree within one block or wire message
    LengthMismatch {
        /// Channel whose length disagrees
        channel: String,
        /// Length of the first channel seen
        expected: usize,
        /// Length actually found
        actual: usize,
    },

    /// Low-pass cutoff outside the open (0, Nyquist) interval
    InvalidCutoff {
        /// Requested cutoff in Hz
        cutoff_hz: f64,
        /// Sample rate the cutoff was checked against
        sample_rate_hz: f64,
    },

    /// Decimation factor below 1
    InvalidFactor {
        /// Requested factor
        factor: usize,
    },

    /// Wire payload could not be decoded
    MalformedPayload {
        /// Description of the decode failure
        reason: String,
    },

    /// The inference oracle failed or returned an unusable result
    OracleFailure {
        /// Description of the oracle failure
        reason: String,
    },

    /// Publish or subscribe on the message bus failed
    TransportFailure {
        /// Description of the transport failure
        reason: String,
    },

    /// Raw recording file could not be parsed
    FormatError {
        /// Description of the parse failure
        reason: String,
    },

    /// Invalid node or pipeline configuration
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Signal block construction failed validation
    InvalidBlock {
        /// Description of the validation failure
        reason: String,
    },
}

impl fmt::Display for EcgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcgError::MissingChannel { channel } => {
                write!(f, "Missing channel: '{}'", channel)
            }
            EcgError::LengthMismatch { channel, expected, actual } => {
                write!(
                    f,
                    "Length mismatch on channel '{}': expected {} samples, found {}",
                    channel, expected, actual
                )
            }
            EcgError::InvalidCutoff { cutoff_hz, sample_rate_hz } => {
                write!(
                    f,
                    "Invalid cutoff: {}Hz must lie strictly between 0 and Nyquist ({}Hz)",
                    cutoff_hz,
                    sample_rate_hz / 2.0
                )
            }
            EcgError::InvalidFactor { factor } => {
                write!(f, "Invalid decimation factor: {} (must be at least 1)", factor)
            }
            EcgError::MalformedPayload { reason } => {
                write!(f, "Malformed payload: {}", reason)
            }
            EcgError::OracleFailure { reason } => {
                write!(f, "Oracle failure: {}", reason)
            }
            EcgError::TransportFailure { reason } => {
                write!(f, "Transport failure: {}", reason)
            }
            EcgError::FormatError { reason } => {
                write!(f, "Format error: {}", reason)
            }
            EcgError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            EcgError::InvalidBlock { reason } => {
                write!(f, "Invalid signal block: {}", reason)
            }
        }
    }
}

impl std::error::Error for EcgError {}
