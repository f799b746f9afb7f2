use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Text shown by an info segment whose config carries none.
pub const DEFAULT_INFO_TEXT: &str = "Welcome";

/// One gameplay clip of the reel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Identity tag.
    #[serde(default)]
    pub id: String,
    /// Display title; also names the exported file.
    #[serde(alias = "clip_title_name")]
    pub title: String,
    /// Source gameplay video.
    #[serde(default)]
    pub video: Option<PathBuf>,
    /// Stamped result image laid over the full frame.
    #[serde(default, alias = "main_image")]
    pub result_image: Option<PathBuf>,
    /// Per-clip background image.
    #[serde(default, alias = "bg_image")]
    pub background_image: Option<PathBuf>,
    /// Requested in point in source seconds.
    #[serde(default)]
    pub start: f64,
    /// Requested out point in source seconds.
    #[serde(default)]
    pub end: f64,
    /// Commentary text.
    #[serde(default)]
    pub text: String,
    /// Re-center the square crop on the detected ring marker.
    #[serde(default = "default_true")]
    pub auto_center_align: bool,
}

fn default_true() -> bool {
    true
}

/// One intro or ending commentary clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfoClipConfig {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "clip_title_name")]
    pub title: String,
    /// Display duration in seconds.
    pub duration: f64,
    #[serde(default = "default_info_text")]
    pub text: String,
}

fn default_info_text() -> String {
    DEFAULT_INFO_TEXT.to_owned()
}

/// Validated `[start, end)` play window in source seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Source time of the middle of the window.
    pub fn midpoint(self) -> f64 {
        self.start + self.duration() / 2.0
    }
}

/// A correction applied by [`clamp_window`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowAdjustment {
    /// `start` was negative (or not a number) and moved to 0.
    StartNegative { requested: f64 },
    /// `start` was at or past the end of the source and moved to 0.
    StartPastEnd {
        requested: f64,
        source_duration: f64,
    },
    /// `end` did not come after `start` and was moved to `adjusted`.
    EndNotAfterStart { requested: f64, adjusted: f64 },
    /// `end` was past the end of the source and moved to it.
    EndPastEnd {
        requested: f64,
        source_duration: f64,
    },
}

impl fmt::Display for WindowAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::StartNegative { requested } => {
                write!(f, "start {requested}s is negative; using 0")
            }
            Self::StartPastEnd { requested, .. } => {
                write!(f, "start {requested}s is past the source end; using 0")
            }
            Self::EndNotAfterStart { adjusted, .. } => {
                write!(f, "end is not after start; using {adjusted}s")
            }
            Self::EndPastEnd { requested, .. } => {
                write!(f, "end {requested}s is past the source end; truncated")
            }
        }
    }
}

/// Clamp a requested window into `[0, source_duration]`.
///
/// Never rejects: `start < 0` or `start ≥ duration` becomes 0; `end ≤ start` becomes
/// `min(start + 1, duration)`; `end > duration` becomes `duration`. Every correction is reported.
/// An unknown source length can be passed as `f64::INFINITY`.
pub fn clamp_window(
    start: f64,
    end: f64,
    source_duration: f64,
) -> (ClipWindow, Vec<WindowAdjustment>) {
    let mut adjustments = Vec::new();

    let mut s = start;
    if s.is_nan() || s < 0.0 {
        adjustments.push(WindowAdjustment::StartNegative { requested: start });
        s = 0.0;
    } else if s >= source_duration {
        adjustments.push(WindowAdjustment::StartPastEnd {
            requested: start,
            source_duration,
        });
        s = 0.0;
    }

    let mut e = end;
    if e.is_nan() || e <= s {
        e = (s + 1.0).min(source_duration);
        adjustments.push(WindowAdjustment::EndNotAfterStart {
            requested: end,
            adjusted: e,
        });
    } else if e > source_duration {
        adjustments.push(WindowAdjustment::EndPastEnd {
            requested: end,
            source_duration,
        });
        e = source_duration;
    }

    (ClipWindow { start: s, end: e }, adjustments)
}

#[cfg(test)]
#[path = "../../tests/unit/config/clip.rs"]
mod tests;
