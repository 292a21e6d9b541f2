//! Tabular ingest of timestamped PV-generation and load series.
//!
//! The loader reads two CSV files (one series each), aligns them to a
//! common time axis by nearest-match within a bounded tolerance, drops
//! rows with no partner, and returns a synchronized series ready for
//! [`crate::signals::SeriesSignals`]. The engine itself never touches
//! files; this collaborator sits wholly outside its contract.

use std::fs::File;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::signals::SeriesPoint;

/// Errors raised while reading or aligning input series.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot open \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in \"{path}\": {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("\"{path}\" row {row}: {message}")]
    Parse {
        path: String,
        row: usize,
        message: String,
    },
    #[error("no rows remained after aligning the two series")]
    EmptyAfterAlign,
}

/// Accepted timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// One raw `(timestamp, value)` row from a single-series CSV.
type RawRow = (NaiveDateTime, f64);

/// Loads and aligns a PV-generation series and a load series.
///
/// Each file must carry a header row and two columns: a timestamp and a
/// kW value. Rows from the two files are paired by nearest timestamp;
/// pairs further apart than `tolerance` are dropped.
///
/// # Errors
///
/// Fails on unreadable files, malformed CSV, unparseable cells, or when
/// alignment leaves nothing.
pub fn load_aligned_csv(
    pv_path: &Path,
    load_path: &Path,
    tolerance: TimeDelta,
) -> Result<Vec<SeriesPoint>, LoaderError> {
    let pv = read_series(pv_path)?;
    let load = read_series(load_path)?;

    let aligned = align_nearest(&pv, &load, tolerance);
    if aligned.is_empty() {
        return Err(LoaderError::EmptyAfterAlign);
    }
    Ok(aligned)
}

/// Pairs each PV row with the nearest load row within `tolerance`.
///
/// Both inputs are sorted internally; the output is sorted by the PV
/// timestamps that survived.
pub fn align_nearest(
    pv: &[RawRow],
    load: &[RawRow],
    tolerance: TimeDelta,
) -> Vec<SeriesPoint> {
    let mut pv = pv.to_vec();
    let mut load = load.to_vec();
    pv.sort_by_key(|r| r.0);
    load.sort_by_key(|r| r.0);

    let mut out = Vec::with_capacity(pv.len());
    for &(at, generation_kw) in &pv {
        let Some(&(_, load_kw)) = nearest(&load, at, tolerance) else {
            continue;
        };
        out.push(SeriesPoint {
            timestamp: at,
            generation_kw,
            load_kw,
        });
    }
    out
}

/// Nearest row to `at` in a sorted series, if within `tolerance`.
fn nearest(sorted: &[RawRow], at: NaiveDateTime, tolerance: TimeDelta) -> Option<&RawRow> {
    if sorted.is_empty() {
        return None;
    }
    let idx = sorted.partition_point(|r| r.0 < at);
    let candidates = [idx.checked_sub(1), (idx < sorted.len()).then_some(idx)];

    candidates
        .into_iter()
        .flatten()
        .map(|i| &sorted[i])
        .min_by_key(|r| (r.0 - at).abs())
        .filter(|r| (r.0 - at).abs() <= tolerance)
}

/// Reads one `(timestamp, value)` series from a headered CSV file.
fn read_series(path: &Path) -> Result<Vec<RawRow>, LoaderError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: display.clone(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoaderError::Csv {
            path: display.clone(),
            source,
        })?;
        // header is row 0 in the file; records start at row 1
        let row = i + 1;

        let ts_cell = record.get(0).unwrap_or("").trim();
        let value_cell = record.get(1).unwrap_or("").trim();

        let timestamp = parse_timestamp(ts_cell).ok_or_else(|| LoaderError::Parse {
            path: display.clone(),
            row,
            message: format!("unrecognized timestamp \"{ts_cell}\""),
        })?;
        let value: f64 = value_cell.parse().map_err(|_| LoaderError::Parse {
            path: display.clone(),
            row,
            message: format!("\"{value_cell}\" is not a number"),
        })?;

        rows.push((timestamp, value));
    }

    Ok(rows)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
