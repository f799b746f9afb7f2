use tracing::warn;

/// Absolute placement of one clip with its crossfades.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledClip {
    /// Timeline start in seconds.
    pub start: f64,
    pub duration: f64,
    /// Crossfade-in length (0 for the first clip).
    pub fade_in: f64,
    /// Crossfade-out length (0 for the last clip).
    pub fade_out: f64,
}

impl ScheduledClip {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A clip too short for the transition on a side where one happens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShortSegment {
    /// Position in the scheduled sequence.
    pub position: usize,
    pub duration: f64,
    pub transition: f64,
}

/// Result of [`schedule`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    pub clips: Vec<ScheduledClip>,
    pub warnings: Vec<ShortSegment>,
}

impl Schedule {
    /// End of the last clip.
    pub fn total_duration(&self) -> f64 {
        self.clips.last().map_or(0.0, |c| c.end().max(0.0))
    }
}

/// Lay `durations` end to end, each overlapping its predecessor by `transition` seconds.
///
/// `start[0] = 0`, `start[i] = end[i-1] - transition`. Every clip but the first fades in and every
/// clip but the last fades out. A `transition` of 0 is plain concatenation. Clips shorter than the
/// transition on a fading side are reported, not corrected.
pub fn schedule(durations: &[f64], transition: f64) -> Schedule {
    let transition = if transition.is_finite() {
        transition.max(0.0)
    } else {
        0.0
    };
    let n = durations.len();
    let mut out = Schedule::default();
    let mut prev_end = 0.0f64;
    for (i, &duration) in durations.iter().enumerate() {
        let start = if i == 0 { 0.0 } else { prev_end - transition };
        let fade_in = if i > 0 { transition } else { 0.0 };
        let fade_out = if i + 1 < n { transition } else { 0.0 };
        if transition > 0.0 && (fade_in > 0.0 || fade_out > 0.0) && duration < transition {
            warn!(
                position = i,
                duration,
                transition,
                "segment shorter than transition"
            );
            out.warnings.push(ShortSegment {
                position: i,
                duration,
                transition,
            });
        }
        let clip = ScheduledClip {
            start,
            duration,
            fade_in,
            fade_out,
        };
        prev_end = clip.end();
        out.clips.push(clip);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
