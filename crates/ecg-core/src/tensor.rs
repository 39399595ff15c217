//! Numeric tensor handed to the inference oracle

use crate::error::{EcgError, EcgResult};

/// Row-major `[batch, leads, samples]` buffer with a batch dimension of 1
///
/// This is the decode product of the record codec and the input contract of
/// the inference oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadTensor {
    data: Vec<f64>,
    leads: usize,
    samples: usize,
}

impl LeadTensor {
    /// Build a tensor from a lead-major buffer of `leads * samples` values
    pub fn new(leads: usize, samples: usize, data: Vec<f64>) -> EcgResult<Self> {
        if data.len() != leads * samples {
            return Err(EcgError::MalformedPayload {
                reason: format!(
                    "tensor buffer holds {} values, expected {} ({} leads x {} samples)",
                    data.len(),
                    leads * samples,
                    leads,
                    samples
                ),
            });
        }
        Ok(LeadTensor { data, leads, samples })
    }

    /// Tensor shape as `[batch, leads, samples]`
    pub fn shape(&self) -> [usize; 3] {
        [1, self.leads, self.samples]
    }

    /// Number of leads
    pub fn leads(&self) -> usize {
        self.leads
    }

    /// Samples per lead
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// One lead's samples
    pub fn lead(&self, index: usize) -> Option<&[f64]> {
        if index >= self.leads {
            return None;
        }
        let start = index * self.samples;
        Some(&self.data[start..start + self.samples])
    }

    /// Full row-major buffer
    pub fn data(&self) -> &[f64] {
        &self.data
    }
}
