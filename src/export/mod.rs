//! File-level export: per-segment files, the full timeline, direct concatenation and previews.

/// Export driver and results.
pub mod exporter;
/// Output file naming and ordering.
pub mod naming;
