//! The per-file conditioning chain
//!
//! [`Conditioner`] composes ingest, lead derivation, zero-phase filtering,
//! decimation and millivolt conversion into one pass, reporting which stage
//! a failure occurred in so the acquisition service can log it.

use crate::codec;
use crate::filter::{self, FilterSpec};
use crate::ingest;
use crate::leads;
use crate::resample;
use core::fmt;
use ecg_core::{EcgError, EcgResult, ProcessedRecord, SignalBlock};
use std::path::Path;

/// Stage of the conditioning chain a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStage {
    /// Reading and parsing the raw recording
    Ingest,
    /// Deriving the 12-lead set
    DeriveLeads,
    /// Zero-phase low-pass filtering
    Filter,
    /// Integer decimation
    Resample,
    /// Millivolt conversion and record assembly
    Encode,
}

impl fmt::Display for ConditionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionStage::Ingest => "ingest",
            ConditionStage::DeriveLeads => "derive-leads",
            ConditionStage::Filter => "filter",
            ConditionStage::Resample => "resample",
            ConditionStage::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// A conditioning failure, tagged with the stage it occurred in
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionError {
    /// Stage that failed
    pub stage: ConditionStage,
    /// Underlying error
    pub error: EcgError,
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for ConditionError {}

/// Signal conditioning pass shared by every acquired file
///
/// The filter spec and decimation factor are fixed per pipeline instance;
/// each call owns its block exclusively.
#[derive(Debug, Clone)]
pub struct Conditioner {
    spec: FilterSpec,
    factor: usize,
    source_rate_hz: f64,
}

impl Conditioner {
    /// Build a conditioner from source/target rates and filter parameters
    ///
    /// The decimation factor is `floor(source / target)`; rate pairs that
    /// floor to zero fail with [`EcgError::InvalidFactor`]. The cutoff is
    /// validated against the source rate here so misconfiguration surfaces
    /// at startup rather than on the first file.
    pub fn from_rates(
        source_rate_hz: f64,
        target_rate_hz: f64,
        filter_order: usize,
        cutoff_hz: f64,
    ) -> EcgResult<Self> {
        if !(source_rate_hz > 0.0) || !(target_rate_hz > 0.0) {
            return Err(EcgError::ConfigError {
                message: format!(
                    "sample rates must be positive, got source {}Hz, target {}Hz",
                    source_rate_hz, target_rate_hz
                ),
            });
        }

        let factor = (source_rate_hz / target_rate_hz).floor() as usize;
        if factor < 1 {
            return Err(EcgError::InvalidFactor { factor });
        }

        let spec = FilterSpec::new(filter_order, cutoff_hz, source_rate_hz);
        spec.validate()?;

        Ok(Conditioner { spec, factor, source_rate_hz })
    }

    /// The filter design used for every file
    pub fn filter_spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// The decimation factor used for every file
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Condition an already-parsed raw block into a processed record
    pub fn condition(
        &self,
        raw: &SignalBlock,
        filename: &str,
    ) -> Result<ProcessedRecord, ConditionError> {
        let derived = leads::derive_leads(raw)
            .map_err(|error| ConditionError { stage: ConditionStage::DeriveLeads, error })?;
        let filtered = filter::apply(&derived, &self.spec)
            .map_err(|error| ConditionError { stage: ConditionStage::Filter, error })?;
        let decimated = resample::decimate(&filtered, self.factor)
            .map_err(|error| ConditionError { stage: ConditionStage::Resample, error })?;
        codec::millivolt_record(&decimated, filename)
            .map_err(|error| ConditionError { stage: ConditionStage::Encode, error })
    }

    /// Ingest a raw recording file and condition it
    pub fn condition_file(&self, path: &Path) -> Result<ProcessedRecord, ConditionError> {
        let raw = ingest::read_raw_recording(path, self.source_rate_hz)
            .map_err(|error| ConditionError { stage: ConditionStage::Ingest, error })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.condition(&raw, &filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::PRECORDIAL_CHANNELS;
    use std::f64::consts::PI;

    /// The reference scenario: 4000 samples at 2000 Hz, everything zero
    /// except a 1 mV, 50 Hz sinusoid on LA.
    fn scenario_block() -> SignalBlock {
        let n = 4000;
        let la: Vec<f64> = (0..n)
            .map(|i| 0.001 * (2.0 * PI * 50.0 * i as f64 / 2000.0).sin())
            .collect();

        let mut channels = vec![
            ("LA".to_string(), la),
            ("RA".to_string(), vec![0.0; n]),
            ("LL".to_string(), vec![0.0; n]),
        ];
        for name in PRECORDIAL_CHANNELS {
            channels.push((name.to_string(), vec![0.0; n]));
        }
        SignalBlock::new(channels, 2000.0).unwrap()
    }

    #[test]
    fn test_end_to_end_conditioning() {
        let conditioner = Conditioner::from_rates(2000.0, 500.0, 5, 200.0).unwrap();
        assert_eq!(conditioner.factor(), 4);

        let record = conditioner.condition(&scenario_block(), "sine.xls").unwrap();

        assert_eq!(record.filename, "sine.xls");
        assert_eq!(record.leads.len(), 12);
        assert_eq!(record.samples_per_lead(), 1000);

        // Lead I = LA - RA = the sinusoid; 0.001 V becomes 1 mV
        let lead_i = &record.lead("I").unwrap().samples;
        for (i, &v) in lead_i.iter().enumerate().skip(50).take(900) {
            // Post-decimation the tone sits at 50 Hz of a 500 Hz signal
            let expected = (2.0 * PI * 50.0 * (i * 4) as f64 / 2000.0).sin();
            assert!(
                (v - expected).abs() < 0.02,
                "lead I sample {}: {} vs {}",
                i,
                v,
                expected
            );
        }

        // III = LL - LA = -LA, so lead III mirrors lead I
        let lead_iii = &record.lead("III").unwrap().samples;
        for (a, b) in lead_i.iter().zip(lead_iii).skip(50).take(900) {
            assert!((a + b).abs() < 1e-9);
        }

        // Quiet electrodes see only the Wilson correction of LA
        let v1 = &record.lead("V1").unwrap().samples;
        for (&s, &i_mv) in v1.iter().zip(lead_i).skip(50).take(900) {
            assert!((s + 0.333 * i_mv).abs() < 1e-9);
        }
    }

    #[test]
    fn test_factor_below_one_rejected() {
        let err = Conditioner::from_rates(500.0, 2000.0, 5, 100.0).unwrap_err();
        assert!(matches!(err, EcgError::InvalidFactor { factor: 0 }));
    }

    #[test]
    fn test_bad_cutoff_surfaces_at_construction() {
        let err = Conditioner::from_rates(2000.0, 500.0, 5, 1000.0).unwrap_err();
        assert!(matches!(err, EcgError::InvalidCutoff { .. }));
    }

    #[test]
    fn test_stage_attribution_for_missing_channels() {
        let conditioner = Conditioner::from_rates(2000.0, 500.0, 5, 200.0).unwrap();
        let raw = SignalBlock::new(vec![("LA".to_string(), vec![0.0; 64])], 2000.0).unwrap();
        let err = conditioner.condition(&raw, "bad.xls").unwrap_err();
        assert_eq!(err.stage, ConditionStage::DeriveLeads);
        assert!(matches!(err.error, EcgError::MissingChannel { .. }));
    }

    #[test]
    fn test_missing_file_is_ingest_failure() {
        let conditioner = Conditioner::from_rates(2000.0, 500.0, 5, 200.0).unwrap();
        let err = conditioner.condition_file(Path::new("/nonexistent/rec.xls")).unwrap_err();
        assert_eq!(err.stage, ConditionStage::Ingest);
    }
}
