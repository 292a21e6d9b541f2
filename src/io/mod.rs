//! File-based collaborators: series ingest and telemetry export.

/// CSV telemetry export for completed episodes.
pub mod export;
/// Timestamped series ingest and alignment.
pub mod loader;

pub use loader::{LoaderError, load_aligned_csv};
