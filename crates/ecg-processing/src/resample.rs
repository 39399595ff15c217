//! Sample-rate reduction by integer decimation

use ecg_core::{EcgError, EcgResult, SignalBlock};

/// Keep every `factor`-th sample of every channel, starting at index 0
///
/// Output channels hold `floor(len / factor)` samples; `factor = 1` is the
/// identity. Anti-aliasing is the caller's responsibility: the upstream
/// low-pass cutoff must not exceed the post-decimation Nyquist frequency.
pub fn decimate(block: &SignalBlock, factor: usize) -> EcgResult<SignalBlock> {
    if factor < 1 {
        return Err(EcgError::InvalidFactor { factor });
    }

    let out_len = block.samples_per_channel() / factor;
    let decimated = block
        .iter()
        .map(|(name, samples)| {
            let kept = (0..out_len).map(|i| samples[i * factor]).collect();
            (name.to_string(), kept)
        })
        .collect();

    SignalBlock::new(decimated, block.sample_rate_hz() / factor as f64)
}
