//! SignalBlock: container for multi-channel ECG data

use crate::error::{EcgError, EcgResult};
use uuid::Uuid;

/// Named multi-channel signal container
///
/// Channels are stored column-major (one contiguous buffer per channel) so
/// that per-channel operations such as filtering and decimation work on
/// plain slices. All channels have equal length; names are
/// whitespace-trimmed on ingest and compared case-insensitively.
#[derive(Debug, Clone)]
pub struct SignalBlock {
    /// Identifier used to correlate log lines across pipeline stages
    pub id: Uuid,
    names: Vec<String>,
    channels: Vec<Vec<f64>>,
    sample_rate_hz: f64,
}

impl SignalBlock {
    /// Create a new block from `(name, samples)` pairs
    ///
    /// Names are trimmed; duplicates (case-insensitive) and empty names are
    /// rejected, as are channels of unequal length.
    pub fn new(channels: Vec<(String, Vec<f64>)>, sample_rate_hz: f64) -> EcgResult<Self> {
        if channels.is_empty() {
            return Err(EcgError::InvalidBlock {
                reason: "block must contain at least one channel".to_string(),
            });
        }
        if !(sample_rate_hz > 0.0) {
            return Err(EcgError::InvalidBlock {
                reason: format!("sample rate must be positive, got {}", sample_rate_hz),
            });
        }

        let mut names = Vec::with_capacity(channels.len());
        let mut data = Vec::with_capacity(channels.len());
        let expected = channels[0].1.len();

        for (raw_name, samples) in channels {
            let name = raw_name.trim().to_string();
            if name.is_empty() {
                return Err(EcgError::InvalidBlock {
                    reason: "channel names must be non-empty".to_string(),
                });
            }
            if names.iter().any(|n: &String| n.eq_ignore_ascii_case(&name)) {
                return Err(EcgError::InvalidBlock {
                    reason: format!("duplicate channel name '{}'", name),
                });
            }
            if samples.len() != expected {
                return Err(EcgError::LengthMismatch {
                    channel: name,
                    expected,
                    actual: samples.len(),
                });
            }
            names.push(name);
            data.push(samples);
        }

        Ok(SignalBlock {
            id: Uuid::new_v4(),
            names,
            channels: data,
            sample_rate_hz,
        })
    }

    /// Number of channels in the block
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn samples_per_channel(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Check whether the block carries no samples
    pub fn is_empty(&self) -> bool {
        self.samples_per_channel() == 0
    }

    /// Sample rate in Hz
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Channel names, in insertion order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up a channel by name (case-insensitive)
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        let wanted = name.trim();
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(wanted))
            .map(|idx| self.channels[idx].as_slice())
    }

    /// Look up a channel by name, failing with [`EcgError::MissingChannel`]
    pub fn require_channel(&self, name: &str) -> EcgResult<&[f64]> {
        self.channel(name).ok_or_else(|| EcgError::MissingChannel {
            channel: name.to_string(),
        })
    }

    /// Iterate over `(name, samples)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.channels.iter().map(Vec::as_slice))
    }

    /// Signal duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples_per_channel() as f64 / self.sample_rate_hz
    }
}
