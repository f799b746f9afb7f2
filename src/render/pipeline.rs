use tracing::{info, warn};

use crate::assets::media::{MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio};
use crate::audio::mix::{MixBuffer, write_f32le_file};
use crate::audio::normalize::loudness_gain;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{EngineError, EngineResult};
use crate::render::cpu::TimelineRenderer;
use crate::timeline::assemble::Timeline;

/// Counters reported by [`render_timeline`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    /// Entries whose audio made it into the mix.
    pub audio_sources: usize,
}

/// Mix the audio of every entry of `timeline` into one interleaved buffer at
/// [`MIX_SAMPLE_RATE`].
///
/// Each source is gain-normalized on its own, then placed at its entry with the entry's fades.
/// Sources that fail to decode are skipped with a warning. Returns `None` when nothing was mixed.
pub fn mix_timeline_audio(timeline: &Timeline) -> Option<(Vec<f32>, usize)> {
    let mut mix = MixBuffer::new(MIX_SAMPLE_RATE, MIX_CHANNELS, timeline.duration);
    let mut sources = 0usize;
    for entry in &timeline.entries {
        let Some(audio) = entry.body.audio() else {
            continue;
        };
        let pcm = match decode_audio(&audio.path, audio.window) {
            Ok(pcm) => pcm,
            Err(e) => {
                warn!(path = %audio.path.display(), error = %e, "audio source skipped");
                continue;
            }
        };
        if pcm.frames() == 0 {
            continue;
        }
        let gain = loudness_gain(&pcm);
        mix.add(&pcm, &entry.audio_placement(gain));
        sources += 1;
    }
    (sources > 0).then(|| (mix.finish(), sources))
}

/// Render `timeline` frame by frame into `sink`, with its mixed audio.
///
/// The frame count is the timeline duration rounded to whole frames.
#[tracing::instrument(
    skip_all,
    fields(duration = timeline.duration, entries = timeline.entries.len())
)]
pub fn render_timeline(
    timeline: &Timeline,
    canvas: Canvas,
    fps: Fps,
    sink: &mut dyn FrameSink,
) -> EngineResult<RenderStats> {
    let frames = fps.secs_to_frames_round(timeline.duration);
    if frames == 0 {
        return Err(EngineError::validation("timeline is empty"));
    }

    // Kept alive until the sink has finished reading it.
    let mut audio_tmp = None;
    let mut stats = RenderStats::default();
    let audio = match mix_timeline_audio(timeline) {
        Some((samples, sources)) => {
            let tmp = tempfile::Builder::new()
                .prefix("reelforge_mix_")
                .suffix(".f32le")
                .tempfile()
                .map_err(|e| EngineError::encode(format!("create audio temp file: {e}")))?;
            write_f32le_file(&samples, tmp.path())?;
            let cfg = AudioInputConfig {
                path: tmp.path().to_path_buf(),
                sample_rate: MIX_SAMPLE_RATE,
                channels: MIX_CHANNELS,
            };
            audio_tmp = Some(tmp);
            stats.audio_sources = sources;
            Some(cfg)
        }
        None => None,
    };

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
        audio,
    })?;

    let mut renderer = TimelineRenderer::new(timeline, canvas, fps);
    for f in 0..frames {
        let idx = FrameIndex(f);
        let frame = renderer.render_at(fps.frame_to_secs(idx))?;
        sink.push_frame(idx, &frame)?;
        stats.frames += 1;
    }
    drop(renderer);
    sink.end()?;
    drop(audio_tmp);

    info!(
        frames = stats.frames,
        audio_sources = stats.audio_sources,
        "timeline rendered"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
