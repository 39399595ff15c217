//! Wire codec for processed records
//!
//! The raw-signal payload is JSON: a filename plus a `records` array holding
//! one object per sample index, each mapping lead name to millivolt value.
//! Decode is strict: every row must carry exactly the 12 standard leads, and
//! any violation is reported as [`EcgError::MalformedPayload`] so the
//! consumer can skip the message and keep running.

use ecg_core::{
    EcgError, EcgResult, LeadTensor, LeadTrace, ProcessedRecord, SignalBlock, DERIVED_LEAD_ORDER,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unit conversion applied at encode time; upstream stages work in volts
pub const MILLIVOLTS_PER_VOLT: f64 = 1000.0;

/// Wire form of the raw-signal message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignalMessage {
    /// Basename of the source recording
    pub filename: String,
    /// One object per sample index, lead name -> millivolt value
    pub records: Vec<BTreeMap<String, f64>>,
}

/// Convert a conditioned block (volts) into a [`ProcessedRecord`] (millivolts)
pub fn millivolt_record(block: &SignalBlock, filename: &str) -> EcgResult<ProcessedRecord> {
    let leads = block
        .iter()
        .map(|(name, samples)| LeadTrace {
            name: name.to_string(),
            samples: samples.iter().map(|v| v * MILLIVOLTS_PER_VOLT).collect(),
        })
        .collect();
    ProcessedRecord::new(filename.to_string(), leads)
}

/// Serialize a record into raw-signal message bytes
pub fn encode(record: &ProcessedRecord) -> EcgResult<Vec<u8>> {
    let samples = record.samples_per_lead();
    let mut records = Vec::with_capacity(samples);
    for i in 0..samples {
        let row = record
            .leads
            .iter()
            .map(|trace| (trace.name.clone(), trace.samples[i]))
            .collect();
        records.push(row);
    }

    let message = RawSignalMessage {
        filename: record.filename.clone(),
        records,
    };
    serde_json::to_vec(&message).map_err(|e| EcgError::MalformedPayload {
        reason: format!("serialization failed: {}", e),
    })
}

/// Deserialize raw-signal message bytes back into a [`ProcessedRecord`]
///
/// Lead traces come back in the fixed 12-lead order regardless of JSON key
/// order.
pub fn decode(bytes: &[u8]) -> EcgResult<ProcessedRecord> {
    let message: RawSignalMessage =
        serde_json::from_slice(bytes).map_err(|e| EcgError::MalformedPayload {
            reason: format!("unparsable raw-signal message: {}", e),
        })?;

    let mut traces: Vec<LeadTrace> = DERIVED_LEAD_ORDER
        .iter()
        .map(|name| LeadTrace {
            name: name.to_string(),
            samples: Vec::with_capacity(message.records.len()),
        })
        .collect();

    for (row_idx, row) in message.records.iter().enumerate() {
        if row.len() != DERIVED_LEAD_ORDER.len() {
            return Err(EcgError::MalformedPayload {
                reason: format!(
                    "record {} carries {} leads, expected {}",
                    row_idx,
                    row.len(),
                    DERIVED_LEAD_ORDER.len()
                ),
            });
        }
        for trace in traces.iter_mut() {
            let value = row.get(&trace.name).ok_or_else(|| EcgError::MalformedPayload {
                reason: format!("record {} is missing lead '{}'", row_idx, trace.name),
            })?;
            trace.samples.push(*value);
        }
    }

    ProcessedRecord::new(message.filename, traces)
}

/// Arrange a record as the `[1, leads, samples]` tensor the oracle expects
pub fn to_tensor(record: &ProcessedRecord) -> EcgResult<LeadTensor> {
    let leads = record.leads.len();
    let samples = record.samples_per_lead();

    let mut data = Vec::with_capacity(leads * samples);
    for trace in &record.leads {
        if trace.samples.len() != samples {
            return Err(EcgError::LengthMismatch {
                channel: trace.name.clone(),
                expected: samples,
                actual: trace.samples.len(),
            });
        }
        data.extend_from_slice(&trace.samples);
    }

    LeadTensor::new(leads, samples, data)
}
