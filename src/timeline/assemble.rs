use tracing::{info, warn};

use crate::audio::mix::AudioPlacement;
use crate::segment::model::{Segment, SegmentAudio};
use crate::timeline::schedule::{ShortSegment, schedule};
use crate::timeline::tail_merge::{MergeInfeasible, TailMergePlan, plan_tail_merge};

/// What one timeline entry shows.
#[derive(Clone, Debug)]
pub enum EntryBody {
    Single(Segment),
    /// Last content clip with the endings spliced over its tail; audio is the content clip's.
    TailMerge {
        content: Segment,
        endings: Vec<Segment>,
        plan: TailMergePlan,
    },
}

impl EntryBody {
    pub fn duration(&self) -> f64 {
        match self {
            Self::Single(s) => s.duration,
            Self::TailMerge { plan, .. } => plan.duration,
        }
    }

    /// Audio that plays for the whole entry.
    pub fn audio(&self) -> Option<&SegmentAudio> {
        match self {
            Self::Single(s) => s.audio.as_ref(),
            Self::TailMerge { content, .. } => content.audio.as_ref(),
        }
    }

    /// Segment on screen `local` seconds into the entry, with its own local time.
    pub fn segment_at(&self, local: f64) -> (&Segment, f64) {
        let (_, seg, t) = self.slot_at(local);
        (seg, t)
    }

    /// Like [`Self::segment_at`], also returning a stable slot number for the segment within
    /// the entry (0 for the main segment, `k + 1` for the k-th spliced ending).
    pub fn slot_at(&self, local: f64) -> (usize, &Segment, f64) {
        match self {
            Self::Single(s) => (0, s, local),
            Self::TailMerge {
                content,
                endings,
                plan,
            } => match plan.locate(local) {
                Some((k, t)) if k < endings.len() => (k + 1, &endings[k], t),
                _ => (0, content, local),
            },
        }
    }
}

/// One entry placed on the timeline.
#[derive(Clone, Debug)]
pub struct TimelineEntry {
    pub body: EntryBody,
    /// Absolute start in seconds.
    pub start: f64,
    pub duration: f64,
    pub fade_in: f64,
    pub fade_out: f64,
}

impl TimelineEntry {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether the entry is on screen at absolute time `t`.
    pub fn is_visible_at(&self, t: f64) -> bool {
        t >= self.start && t < self.end()
    }

    /// Mixer placement for this entry's audio.
    pub fn audio_placement(&self, gain: f32) -> AudioPlacement {
        AudioPlacement {
            timeline_start_sec: self.start.max(0.0),
            duration_sec: self.duration + self.start.min(0.0),
            gain,
            fade_in_sec: self.fade_in,
            fade_out_sec: self.fade_out,
            looped: self.body.audio().is_some_and(|a| a.looped),
        }
    }
}

/// Fully time-stamped composition.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    /// Absolute end of the last entry.
    pub duration: f64,
    pub warnings: Vec<ShortSegment>,
    /// Set when a requested tail merge fell back to appending.
    pub merge_fallback: Option<MergeInfeasible>,
}

impl Timeline {
    /// A lone segment fading in from and out to black over `fade` seconds.
    pub fn single(segment: Segment, fade: f64) -> Self {
        let duration = segment.duration;
        let fade = fade.max(0.0);
        Self {
            entries: vec![TimelineEntry {
                body: EntryBody::Single(segment),
                start: 0.0,
                duration,
                fade_in: fade,
                fade_out: fade,
            }],
            duration,
            warnings: Vec::new(),
            merge_fallback: None,
        }
    }
}

/// Order intro, content and ending segments into one timeline.
///
/// With `tail_merge`, the endings are spliced into the last content segment when they fit;
/// otherwise everything is appended with transitions.
#[tracing::instrument(
    skip_all,
    fields(intro = intro.len(), content = content.len(), ending = ending.len())
)]
pub fn assemble(
    intro: Vec<Segment>,
    mut content: Vec<Segment>,
    ending: Vec<Segment>,
    transition: f64,
    tail_merge: bool,
) -> Timeline {
    let mut bodies: Vec<EntryBody> = intro.into_iter().map(EntryBody::Single).collect();
    let mut merge_fallback = None;

    let plan = if tail_merge {
        let ending_durations: Vec<f64> = ending.iter().map(|s| s.duration).collect();
        match plan_tail_merge(content.last().map(|s| s.duration), &ending_durations) {
            Ok(plan) => Some(plan),
            Err(reason) => {
                warn!(%reason, "tail merge infeasible; appending endings");
                merge_fallback = Some(reason);
                None
            }
        }
    } else {
        None
    };
    let merged_content = if plan.is_some() { content.pop() } else { None };

    bodies.extend(content.into_iter().map(EntryBody::Single));
    match (plan, merged_content) {
        (Some(plan), Some(last)) => {
            info!(
                visual_cut = plan.visual_cut,
                endings = ending.len(),
                "tail merge applied"
            );
            bodies.push(EntryBody::TailMerge {
                content: last,
                endings: ending,
                plan,
            });
        }
        _ => bodies.extend(ending.into_iter().map(EntryBody::Single)),
    }

    let durations: Vec<f64> = bodies.iter().map(EntryBody::duration).collect();
    let sched = schedule(&durations, transition);
    let last = bodies.len().saturating_sub(1);
    let entries = bodies
        .into_iter()
        .zip(&sched.clips)
        .enumerate()
        .map(|(i, (body, clip))| {
            let mut fade_out = clip.fade_out;
            // The merged block closes the reel by fading to black.
            if i == last && matches!(body, EntryBody::TailMerge { .. }) {
                fade_out = transition.max(0.0);
            }
            TimelineEntry {
                body,
                start: clip.start,
                duration: clip.duration,
                fade_in: clip.fade_in,
                fade_out,
            }
        })
        .collect();

    Timeline {
        entries,
        duration: sched.total_duration(),
        warnings: sched.warnings,
        merge_fallback,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/assemble.rs"]
mod tests;
