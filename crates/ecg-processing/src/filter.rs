//! Zero-phase Butterworth low-pass filtering
//!
//! The filter is redesigned from its [`FilterSpec`] on every call; the design
//! is cheap next to the filtering pass itself, so no coefficient caching is
//! done. Application is forward-backward over a cascade of second-order
//! sections, which cancels the phase response of the single pass.

use ecg_core::{EcgError, EcgResult, SignalBlock};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parameters of one Butterworth low-pass design
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Filter order
    pub order: usize,
    /// Cutoff frequency in Hz
    pub cutoff_hz: f64,
    /// Sample rate of the signal the filter will run at, in Hz
    pub sample_rate_hz: f64,
}

impl FilterSpec {
    /// Create a new spec (validated at design time)
    pub fn new(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Self {
        FilterSpec { order, cutoff_hz, sample_rate_hz }
    }

    /// Cutoff as a fraction of Nyquist; must lie in the open interval (0, 1)
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / (self.sample_rate_hz / 2.0)
    }

    /// Check the spec without designing; used for eager config validation
    pub fn validate(&self) -> EcgResult<()> {
        if self.order == 0 {
            return Err(EcgError::ConfigError {
                message: "filter order must be at least 1".to_string(),
            });
        }
        let wn = self.normalized_cutoff();
        if !(wn > 0.0 && wn < 1.0) || !wn.is_finite() {
            return Err(EcgError::InvalidCutoff {
                cutoff_hz: self.cutoff_hz,
                sample_rate_hz: self.sample_rate_hz,
            });
        }
        Ok(())
    }
}

/// One second-order section of the cascade
///
/// `y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]`,
/// run in direct form II transposed. First-order sections set `b2 = a2 = 0`.
#[derive(Debug, Clone, Copy)]
struct SosSection {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl SosSection {
    /// Single forward pass over `data`, in place
    ///
    /// State starts at the step steady state scaled by the first sample
    /// (valid because every section has unit DC gain), so a signal at rest
    /// produces no startup transient.
    fn run(&self, data: &mut [f64]) {
        let x0 = data.first().copied().unwrap_or(0.0);
        let mut z1 = (1.0 - self.b0) * x0;
        let mut z2 = (self.b2 - self.a2) * x0;
        for sample in data.iter_mut() {
            let x = *sample;
            let y = self.b0 * x + z1;
            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;
            *sample = y;
        }
    }
}

/// Design a Butterworth low-pass as cascaded second-order sections
///
/// Analog prototype poles are taken on the unit circle, paired into
/// conjugate sections, and mapped with the pre-warped bilinear transform.
/// Odd orders contribute one trailing first-order section.
fn design_lowpass(spec: &FilterSpec) -> EcgResult<Vec<SosSection>> {
    spec.validate()?;

    let n = spec.order;
    // Pre-warp the digital cutoff for the bilinear transform
    let k = (PI * spec.normalized_cutoff() / 2.0).tan();
    let k2 = k * k;

    let mut sections = Vec::with_capacity((n + 1) / 2);

    for i in 0..n / 2 {
        // Left-half-plane pole of the unit-cutoff prototype
        let theta = PI * (2 * i + 1) as f64 / (2 * n) as f64;
        let pole = Complex64::new(-theta.sin(), theta.cos());

        // Analog section s^2 + a1s*s + a2s from the conjugate pair
        let a1s = -2.0 * pole.re;
        let a2s = pole.norm_sqr();

        let d = a2s * k2 + a1s * k + 1.0;
        sections.push(SosSection {
            b0: k2 / d,
            b1: 2.0 * k2 / d,
            b2: k2 / d,
            a1: 2.0 * (a2s * k2 - 1.0) / d,
            a2: (a2s * k2 - a1s * k + 1.0) / d,
        });
    }

    if n % 2 == 1 {
        // Real pole at s = -1
        let d = k + 1.0;
        sections.push(SosSection {
            b0: k / d,
            b1: k / d,
            b2: 0.0,
            a1: (k - 1.0) / d,
            a2: 0.0,
        });
    }

    Ok(sections)
}

/// Zero-phase filtering of one channel
///
/// Boundary policy: the channel is extended at both ends by `pad` samples of
/// odd reflection (`2*edge - x`), filtered forward and backward, and the
/// extensions are stripped. This keeps the startup transient of both passes
/// inside the padding.
fn filtfilt_channel(sections: &[SosSection], samples: &[f64], pad: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let n = samples.len();
    let pad = pad.min(n - 1);

    let first = samples[0];
    let last = samples[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    for i in (1..=pad).rev() {
        extended.push(2.0 * first - samples[i]);
    }
    extended.extend_from_slice(samples);
    for i in (n - 1 - pad..n - 1).rev() {
        extended.push(2.0 * last - samples[i]);
    }

    // Forward pass
    for section in sections {
        section.run(&mut extended);
    }
    // Backward pass
    extended.reverse();
    for section in sections {
        section.run(&mut extended);
    }
    extended.reverse();

    extended[pad..pad + n].to_vec()
}

/// Apply a zero-phase Butterworth low-pass to every channel of a block
///
/// The output block has the same channel names, length and sample rate as
/// the input. Fails with [`EcgError::InvalidCutoff`] when the normalized
/// cutoff is outside (0, 1).
pub fn apply(block: &SignalBlock, spec: &FilterSpec) -> EcgResult<SignalBlock> {
    let sections = design_lowpass(spec)?;
    let pad = 3 * (spec.order + 1);

    let filtered = block
        .iter()
        .map(|(name, samples)| (name.to_string(), filtfilt_channel(&sections, samples, pad)))
        .collect();

    SignalBlock::new(filtered, block.sample_rate_hz())
}
