//! Raw recording ingest
//!
//! Acquisition hardware drops tab-delimited text tables (historically with
//! an `.xls` extension): a header row, a leading time column, the electrode
//! channels, and a trailing spare column. The time and spare columns are
//! dropped positionally; the remaining headers become channel names. Values
//! are in volts.

use csv::ReaderBuilder;
use ecg_core::{EcgError, EcgResult, SignalBlock};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse a tab-delimited raw recording from any reader
pub fn parse_raw_recording<R: Read>(reader: R, sample_rate_hz: f64) -> EcgResult<SignalBlock> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| EcgError::FormatError {
            reason: format!("unreadable header row: {}", e),
        })?
        .clone();

    if headers.len() < 3 {
        return Err(EcgError::FormatError {
            reason: format!(
                "expected a time column, signal channels and a spare column, found {} columns",
                headers.len()
            ),
        });
    }

    // Drop the first (time) and last (spare) columns
    let channel_range = 1..headers.len() - 1;
    let names: Vec<String> = headers
        .iter()
        .skip(1)
        .take(channel_range.len())
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row_idx, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|e| EcgError::FormatError {
            reason: format!("row {}: {}", row_idx + 1, e),
        })?;
        for (col_offset, field_idx) in channel_range.clone().enumerate() {
            let field = row.get(field_idx).unwrap_or("");
            let value: f64 = field.trim().parse().map_err(|_| EcgError::FormatError {
                reason: format!(
                    "row {}, column '{}': '{}' is not a number",
                    row_idx + 1,
                    names[col_offset],
                    field
                ),
            })?;
            columns[col_offset].push(value);
        }
    }

    SignalBlock::new(names.into_iter().zip(columns).collect(), sample_rate_hz)
}

/// Read and parse a raw recording file
pub fn read_raw_recording(path: &Path, sample_rate_hz: f64) -> EcgResult<SignalBlock> {
    let file = File::open(path).map_err(|e| EcgError::FormatError {
        reason: format!("cannot open {}: {}", path.display(), e),
    })?;
    parse_raw_recording(file, sample_rate_hz)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_RECORDING: &str = "Time\tLA\tRA\t LL \tSpare\n\
        0.0000\t0.001\t0.002\t0.003\t0\n\
        0.0005\t0.004\t0.005\t0.006\t0\n";

    #[test]
    fn test_parse_drops_time_and_spare_columns() {
        let block = parse_raw_recording(SMALL_RECORDING.as_bytes(), 2000.0).unwrap();
        assert_eq!(block.channel_count(), 3);
        assert_eq!(block.names(), &["LA", "RA", "LL"]);
        assert_eq!(block.channel("LA").unwrap(), &[0.001, 0.004]);
        assert_eq!(block.channel("LL").unwrap(), &[0.003, 0.006]);
        assert_eq!(block.sample_rate_hz(), 2000.0);
    }

    #[test]
    fn test_parse_rejects_non_numeric_cell() {
        let text = "Time\tLA\tSpare\n0.0\tabc\t0\n";
        let err = parse_raw_recording(text.as_bytes(), 2000.0).unwrap_err();
        match err {
            EcgError::FormatError { reason } => {
                assert!(reason.contains("LA"));
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let text = "Time\tLA\tRA\tSpare\n0.0\t0.1\t0.2\t0\n0.0005\t0.3\t0\n";
        let err = parse_raw_recording(text.as_bytes(), 2000.0).unwrap_err();
        assert!(matches!(err, EcgError::FormatError { .. }));
    }

    #[test]
    fn test_parse_rejects_too_few_columns() {
        let text = "Time\tSpare\n0.0\t0\n";
        let err = parse_raw_recording(text.as_bytes(), 2000.0).unwrap_err();
        assert!(matches!(err, EcgError::FormatError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_raw_recording(Path::new("/nonexistent/rec.xls"), 2000.0).unwrap_err();
        assert!(matches!(err, EcgError::FormatError { .. }));
    }
}
