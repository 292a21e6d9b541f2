//! CSV export for episode step logs.
//!
//! The engine keeps no history; the caller collects `StepResult`s and
//! hands them here for telemetry.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::env::StepResult;

/// Schema v1 column header for CSV telemetry export.
const HEADER: &str = "step,timestamp,soc,load_kw,generation_kw,price,\
                      grid_import_kw,grid_export_kw,requested_kw,\
                      corrected_kw,actual_kw,action_penalty,soc_penalty,\
                      reward,violations";

/// Exports an episode's step log to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(steps: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(steps, buf)
}

/// Writes an episode's step log as CSV to any writer.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(steps: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in steps {
        let i = &r.info;
        wtr.write_record(&[
            i.step.to_string(),
            i.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.6}", i.soc),
            format!("{:.4}", i.load_kw),
            format!("{:.4}", i.generation_kw),
            format!("{:.4}", i.price),
            format!("{:.4}", i.grid_import_kw),
            format!("{:.4}", i.grid_export_kw),
            format!("{:.4}", i.requested_action_kw),
            format!("{:.4}", i.corrected_action_kw),
            format!("{:.4}", i.actual_action_kw),
            format!("{:.4}", i.action_penalty),
            format!("{:.4}", i.soc_penalty),
            format!("{:.6}", r.reward),
            i.violations.len().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
