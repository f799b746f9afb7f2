use crate::config::clip::{ClipConfig, InfoClipConfig};
use crate::config::game::GameKind;
use crate::config::style::StyleConfig;
use crate::encode::ffmpeg::EncodeSettings;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Output and encoder settings shared by every export of a job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Target video bitrate in `ffmpeg` notation (`"4000k"`).
    pub video_bitrate: String,
    pub video_codec: String,
    /// x264 preset for per-segment exports.
    pub segment_preset: String,
    /// x264 preset for the full-timeline export.
    pub full_preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub segment_threads: u32,
    pub full_threads: u32,
    /// Crossfade between segments (and fade-to-black on segment exports).
    pub auto_transition: bool,
    /// Transition length in seconds.
    pub transition_secs: f64,
    /// Splice the ending segments into the tail of the last content clip.
    pub tail_merge: bool,
    /// Play the last content clip until five seconds before its source ends (full export only).
    pub extend_last_clip: bool,
    /// Re-render segment files that already exist.
    pub force_render: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            video_bitrate: "4000k".to_owned(),
            video_codec: "libx264".to_owned(),
            segment_preset: "ultrafast".to_owned(),
            full_preset: "medium".to_owned(),
            audio_codec: "aac".to_owned(),
            audio_bitrate: "192k".to_owned(),
            segment_threads: 4,
            full_threads: 12,
            auto_transition: true,
            transition_secs: 1.0,
            tail_merge: false,
            extend_last_clip: false,
            force_render: false,
        }
    }
}

impl RenderOptions {
    pub fn canvas(&self) -> EngineResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    pub fn fps(&self) -> EngineResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Transition length actually scheduled: zero when transitions are off.
    pub fn effective_transition(&self) -> f64 {
        if self.auto_transition {
            self.transition_secs.max(0.0)
        } else {
            0.0
        }
    }

    /// Encoder settings for per-segment files.
    pub fn segment_encode(&self) -> EncodeSettings {
        self.encode_with(&self.segment_preset, self.segment_threads)
    }

    /// Encoder settings for the full-timeline file.
    pub fn full_encode(&self) -> EncodeSettings {
        self.encode_with(&self.full_preset, self.full_threads)
    }

    fn encode_with(&self, preset: &str, threads: u32) -> EncodeSettings {
        EncodeSettings {
            video_codec: self.video_codec.clone(),
            preset: preset.to_owned(),
            video_bitrate: self.video_bitrate.clone(),
            audio_codec: self.audio_codec.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
            threads,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.canvas()?;
        self.fps()?;
        if !self.transition_secs.is_finite() || self.transition_secs < 0.0 {
            return Err(EngineError::validation(format!(
                "transition_secs must be a non-negative number, got {}",
                self.transition_secs
            )));
        }
        if self.video_bitrate.trim().is_empty() || self.audio_bitrate.trim().is_empty() {
            return Err(EngineError::validation("bitrates must not be empty"));
        }
        Ok(())
    }
}

/// Everything needed to render one reel: clips, style and output settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub game: GameKind,
    /// Owner name; names the full-timeline file.
    pub owner: String,
    /// Directory receiving every output file.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub intro: Vec<InfoClipConfig>,
    #[serde(default)]
    pub content: Vec<ClipConfig>,
    #[serde(default)]
    pub ending: Vec<InfoClipConfig>,
    #[serde(default)]
    pub options: RenderOptions,
}

impl RenderJob {
    /// Parse a job from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> EngineResult<Self> {
        let job: Self = serde_json::from_reader(r)
            .map_err(|e| EngineError::serde(format!("parse render job JSON: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    /// Parse a job from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EngineError::validation(format!("open render job JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.options.validate()?;
        for clip in self.intro.iter().chain(&self.ending) {
            if !clip.duration.is_finite() || clip.duration <= 0.0 {
                return Err(EngineError::validation(format!(
                    "info clip '{}' needs a positive duration, got {}",
                    clip.title, clip.duration
                )));
            }
        }
        Ok(())
    }

    /// Total number of segments, in export order.
    pub fn segment_count(&self) -> usize {
        self.intro.len() + self.content.len() + self.ending.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/job.rs"]
mod tests;
