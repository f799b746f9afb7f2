//! JSON-facing configuration: clips, styles, game profiles and render jobs.

/// Clip configs and play-window clamping.
pub mod clip;
/// Per-game layout profiles.
pub mod game;
/// Render jobs and output options.
pub mod job;
/// Style bundles and text styles.
pub mod style;
