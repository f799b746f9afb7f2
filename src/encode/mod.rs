//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are used by `render_timeline`.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`) and concat helper.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
