//! ECG-Processing: signal conditioning for raw ECG recordings
//!
//! Raw multi-electrode recordings are turned into publishable 12-lead
//! records: ingest → lead derivation → zero-phase low-pass → decimation →
//! millivolt conversion, plus the wire codec used on both sides of the
//! pub/sub boundary.

pub mod codec;
pub mod filter;
pub mod ingest;
pub mod leads;
pub mod pipeline;
pub mod resample;

pub use codec::{decode, encode, millivolt_record, to_tensor, RawSignalMessage};
pub use filter::{apply, FilterSpec};
pub use ingest::{parse_raw_recording, read_raw_recording};
pub use leads::derive_leads;
pub use pipeline::{ConditionError, ConditionStage, Conditioner};
pub use resample::decimate;
