//! Units exchanged over the pub/sub boundary

use crate::error::{EcgError, EcgResult};
use crate::labels::{LABEL_VOCABULARY, NORMAL_SENTINEL};
use serde::{Deserialize, Serialize};

/// One named lead and its sample sequence, in millivolts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadTrace {
    /// Lead name, e.g. `I` or `V3`
    pub name: String,
    /// Ordered samples in millivolts
    pub samples: Vec<f64>,
}

/// A conditioned recording ready for inference
///
/// Produced once per input file by the acquisition side and consumed once by
/// the inference side. Lead order is significant and all traces share one
/// length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Basename of the source recording
    pub filename: String,
    /// Lead traces, in the fixed 12-lead order
    pub leads: Vec<LeadTrace>,
}

impl ProcessedRecord {
    /// Create a record, validating that all lead traces have equal length
    pub fn new(filename: String, leads: Vec<LeadTrace>) -> EcgResult<Self> {
        if let Some(first) = leads.first() {
            let expected = first.samples.len();
            for trace in &leads[1..] {
                if trace.samples.len() != expected {
                    return Err(EcgError::LengthMismatch {
                        channel: trace.name.clone(),
                        expected,
                        actual: trace.samples.len(),
                    });
                }
            }
        }
        Ok(ProcessedRecord { filename, leads })
    }

    /// Samples carried per lead
    pub fn samples_per_lead(&self) -> usize {
        self.leads.first().map(|t| t.samples.len()).unwrap_or(0)
    }

    /// Look up a lead trace by name (case-insensitive)
    pub fn lead(&self, name: &str) -> Option<&LeadTrace> {
        self.leads.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Diagnostic labels for one processed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Labels that cleared the threshold, in vocabulary order
    pub labels: Vec<String>,
}

impl InferenceResult {
    /// Collect labels whose probability strictly exceeds `threshold`
    ///
    /// Probabilities are indexed against the fixed vocabulary; a probability
    /// exactly at the threshold is excluded.
    pub fn from_probabilities(probabilities: &[f32], threshold: f32) -> EcgResult<Self> {
        if probabilities.len() != LABEL_VOCABULARY.len() {
            return Err(EcgError::OracleFailure {
                reason: format!(
                    "expected {} class probabilities, got {}",
                    LABEL_VOCABULARY.len(),
                    probabilities.len()
                ),
            });
        }

        let labels = LABEL_VOCABULARY
            .iter()
            .zip(probabilities)
            .filter(|(_, &p)| p > threshold)
            .map(|(label, _)| label.to_string())
            .collect();

        Ok(InferenceResult { labels })
    }

    /// True when no label cleared the threshold
    pub fn is_normal(&self) -> bool {
        self.labels.is_empty()
    }

    /// Wire form: comma-joined label codes, or the `"Normal"` sentinel
    pub fn to_wire(&self) -> String {
        if self.is_normal() {
            NORMAL_SENTINEL.to_string()
        } else {
            self.labels.join(",")
        }
    }
}
