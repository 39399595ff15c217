//! Inference oracle interface
//!
//! The pretrained classifier is an external collaborator: the consumer hands
//! it a `[1, 12, N]` tensor and gets back 26 raw logits. Sigmoid activation
//! is applied by the consumer, not here.

use ecg_core::{EcgError, EcgResult, LeadTensor, LABEL_VOCABULARY};

/// Black-box classifier invoked once per received record
///
/// Implementations may block for the duration of the call; the consumer runs
/// them on a blocking worker thread under a timeout.
pub trait InferenceOracle: Send + Sync {
    /// Produce one raw logit per vocabulary label
    fn infer(&self, input: &LeadTensor) -> EcgResult<Vec<f32>>;
}

/// Deterministic stand-in used until a real model backend is wired in
///
/// Returns a fixed logit vector regardless of input, after checking the
/// tensor shape the way a real backend would.
pub struct StubOracle {
    logits: Vec<f32>,
}

impl StubOracle {
    /// Oracle returning the given logits for every record
    pub fn new(logits: Vec<f32>) -> Self {
        StubOracle { logits }
    }
}

impl Default for StubOracle {
    /// Strongly negative logits everywhere: every record reads as normal
    fn default() -> Self {
        StubOracle {
            logits: vec![-10.0; LABEL_VOCABULARY.len()],
        }
    }
}

impl InferenceOracle for StubOracle {
    fn infer(&self, input: &LeadTensor) -> EcgResult<Vec<f32>> {
        let [batch, leads, _] = input.shape();
        if batch != 1 || leads != 12 {
            return Err(EcgError::OracleFailure {
                reason: format!(
                    "expected input shape [1, 12, N], got [{}, {}, {}]",
                    batch,
                    leads,
                    input.samples()
                ),
            });
        }
        Ok(self.logits.clone())
    }
}
