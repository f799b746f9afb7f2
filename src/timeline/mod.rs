//! Placement of segments in absolute time.

/// Timeline assembly.
pub mod assemble;
/// Crossfade scheduling.
pub mod schedule;
/// Splicing endings into the last content segment.
pub mod tail_merge;
