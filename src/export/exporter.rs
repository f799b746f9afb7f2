use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::assets::store::resolve_asset;
use crate::config::clip::{ClipConfig, InfoClipConfig};
use crate::config::job::RenderJob;
use crate::encode::ffmpeg::{
    EncodeSettings, FfmpegSink, FfmpegSinkOpts, concat_copy, ensure_parent_dir,
};
use crate::export::naming::{
    FINAL_OUTPUT_NAME, PARTIAL_PREFIX, full_video_file_name, is_segment_file, parse_index_prefix,
    segment_file_name, sort_by_index_prefix,
};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{EngineError, EngineResult};
use crate::render::cpu::render_segment_frame;
use crate::render::pipeline::render_timeline;
use crate::segment::builder::BuildContext;
use crate::segment::model::{Segment, SegmentKind};
use crate::text::render::TextRenderer;
use crate::timeline::assemble::{Timeline, assemble};

/// Outcome of one export call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStatus {
    Success,
    Skipped,
    Error,
}

/// Status and human-readable detail of one export call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    pub status: RenderStatus,
    pub message: String,
    /// File written (or found, when skipped).
    pub output: Option<PathBuf>,
}

impl RenderResult {
    fn success(output: PathBuf) -> Self {
        Self {
            status: RenderStatus::Success,
            message: format!("rendered '{}'", output.display()),
            output: Some(output),
        }
    }

    fn skipped(output: PathBuf) -> Self {
        let shown = output.display().to_string();
        Self {
            status: RenderStatus::Skipped,
            message: format!("'{shown}' already exists; use force to re-render"),
            output: Some(output),
        }
    }

    fn error(message: impl Into<String>, output: Option<PathBuf>) -> Self {
        Self {
            status: RenderStatus::Error,
            message: message.into(),
            output,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RenderStatus::Success
    }
}

/// Config behind one export slot.
#[derive(Clone, Copy, Debug)]
pub enum SegmentSource<'a> {
    Info(&'a InfoClipConfig, SegmentKind),
    Content(&'a ClipConfig),
}

impl SegmentSource<'_> {
    pub fn title(&self) -> &str {
        match self {
            Self::Info(c, _) => &c.title,
            Self::Content(c) => &c.title,
        }
    }
}

/// Drives segment building, rendering and encoding for one [`RenderJob`].
pub struct Exporter<'a> {
    job: &'a RenderJob,
    canvas: Canvas,
    fps: Fps,
    // Font loading is deferred until text is actually rendered.
    text: OnceLock<TextRenderer>,
}

impl<'a> Exporter<'a> {
    pub fn new(job: &'a RenderJob) -> EngineResult<Self> {
        job.validate()?;
        Ok(Self {
            job,
            canvas: job.options.canvas()?,
            fps: job.options.fps()?,
            text: OnceLock::new(),
        })
    }

    /// Every segment in export order: intro, content, ending. The position is the file index.
    pub fn sources(&self) -> Vec<SegmentSource<'a>> {
        let job = self.job;
        job.intro
            .iter()
            .map(|c| SegmentSource::Info(c, SegmentKind::Intro))
            .chain(job.content.iter().map(SegmentSource::Content))
            .chain(
                job.ending
                    .iter()
                    .map(|c| SegmentSource::Info(c, SegmentKind::Ending)),
            )
            .collect()
    }

    /// Output path of segment `index`.
    pub fn segment_path(&self, index: usize) -> Option<PathBuf> {
        let sources = self.sources();
        let src = sources.get(index)?;
        let name = segment_file_name(index, src.title());
        Some(self.job.output_dir.join(name))
    }

    /// Output path of the full-timeline video.
    pub fn full_video_path(&self) -> PathBuf {
        let name = full_video_file_name(&self.job.owner);
        self.job.output_dir.join(name)
    }

    fn text_renderer(&self) -> &TextRenderer {
        self.text.get_or_init(|| {
            TextRenderer::new(&resolve_asset(
                self.job.style.asset_paths.comment_font.as_deref(),
            ))
        })
    }

    fn context(&self) -> BuildContext<'_> {
        BuildContext::new(
            self.job.game,
            &self.job.style,
            self.canvas,
            self.text_renderer(),
        )
    }

    fn build(
        &self,
        index: usize,
        src: SegmentSource<'_>,
        extend_to_tail: bool,
    ) -> EngineResult<Segment> {
        let ctx = self.context();
        match src {
            SegmentSource::Info(clip, kind) => ctx.build_info_segment(clip, kind, index),
            SegmentSource::Content(clip) => ctx.build_content_segment(clip, index, extend_to_tail),
        }
    }

    /// Build segment `index` on its own.
    pub fn build_segment(&self, index: usize) -> EngineResult<Segment> {
        let src = *self.sources().get(index).ok_or_else(|| {
            EngineError::validation(format!(
                "segment index {index} out of range (job has {})",
                self.job.segment_count()
            ))
        })?;
        self.build(index, src, false)
    }

    /// Export segment `index` to `<index>_<title>.mp4` in the output directory.
    ///
    /// An existing file is left alone unless `force` (or the job's `force_render`) is set. With
    /// transitions enabled the segment fades in from and out to black.
    #[tracing::instrument(skip(self))]
    pub fn export_segment(&self, index: usize, force: bool) -> RenderResult {
        let Some(out) = self.segment_path(index) else {
            return RenderResult::error(
                format!(
                    "segment index {index} out of range (job has {})",
                    self.job.segment_count()
                ),
                None,
            );
        };
        if out.exists() && !(force || self.job.options.force_render) {
            info!(path = %out.display(), "segment exists; skipping");
            return RenderResult::skipped(out);
        }

        let result = self.build_segment(index).and_then(|segment| {
            let timeline = Timeline::single(segment, self.job.options.effective_transition());
            self.encode(&timeline, &out, self.job.options.segment_encode())
        });
        match result {
            Ok(()) => {
                info!(path = %out.display(), "segment exported");
                RenderResult::success(out)
            }
            Err(e) => {
                error!(path = %out.display(), error = %e, "segment export failed");
                RenderResult::error(format!("segment {index}: {e}"), Some(out))
            }
        }
    }

    /// Export every segment with consecutive indices. Failures are recorded, never fatal.
    pub fn export_all_segments(&self, force: bool) -> Vec<RenderResult> {
        let results: Vec<RenderResult> = (0..self.job.segment_count())
            .map(|i| self.export_segment(i, force))
            .collect();
        let failed = results
            .iter()
            .filter(|r| r.status == RenderStatus::Error)
            .count();
        if failed > 0 {
            warn!(
                failed,
                total = results.len(),
                "some segments failed to export"
            );
        }
        results
    }

    /// Assemble and export the full timeline to `<owner>_FULL_VIDEO.mp4`.
    #[tracing::instrument(skip(self), fields(owner = %self.job.owner))]
    pub fn export_full(&self) -> RenderResult {
        let out = self.full_video_path();
        match self.build_full_timeline().and_then(|tl| {
            if let Some(reason) = &tl.merge_fallback {
                info!(%reason, "endings appended after content");
            }
            self.encode(&tl, &out, self.job.options.full_encode())
        }) {
            Ok(()) => {
                info!(path = %out.display(), "full video exported");
                RenderResult::success(out)
            }
            Err(e) => {
                error!(path = %out.display(), error = %e, "full video export failed");
                RenderResult::error(format!("full video: {e}"), Some(out))
            }
        }
    }

    /// Build every segment and assemble them per the job's transition and tail-merge options.
    ///
    /// With `extend_last_clip`, the last content clip plays until shortly before its source ends.
    pub fn build_full_timeline(&self) -> EngineResult<Timeline> {
        let opts = &self.job.options;
        let last_content = self.job.intro.len() + self.job.content.len();
        let (mut intro, mut content, mut ending) = (Vec::new(), Vec::new(), Vec::new());
        for (index, src) in self.sources().into_iter().enumerate() {
            let extend = opts.extend_last_clip && index + 1 == last_content;
            let segment = self.build(index, src, extend)?;
            match segment.kind {
                SegmentKind::Intro => intro.push(segment),
                SegmentKind::Content => content.push(segment),
                SegmentKind::Ending => ending.push(segment),
            }
        }
        if content.is_empty() && intro.is_empty() && ending.is_empty() {
            return Err(EngineError::validation("job has no segments"));
        }
        Ok(assemble(
            intro,
            content,
            ending,
            opts.effective_transition(),
            opts.tail_merge,
        ))
    }

    /// Write the frame of segment `index` at local time `at` as a PNG.
    pub fn preview_frame(&self, index: usize, at: f64, out_png: &Path) -> EngineResult<()> {
        let segment = self.build_segment(index)?;
        let frame = render_segment_frame(&segment, self.canvas, self.fps, at)?;
        ensure_parent_dir(out_png)?;
        let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
            .ok_or_else(|| EngineError::validation("rendered frame has an unexpected size"))?;
        img.save(out_png).map_err(|e| {
            EngineError::encode(format!("write preview '{}': {e}", out_png.display()))
        })?;
        info!(path = %out_png.display(), index, at, "preview frame written");
        Ok(())
    }

    fn encode(
        &self,
        timeline: &Timeline,
        out: &Path,
        settings: EncodeSettings,
    ) -> EngineResult<()> {
        write_atomically(out, |partial| {
            let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(partial, settings));
            render_timeline(timeline, self.canvas, self.fps, &mut sink)?;
            Ok(())
        })
    }
}

/// Run `write` against a hidden sibling of `out`, then move the result into place.
///
/// On failure the partial file is removed, so `out` only ever holds a complete encode.
fn write_atomically(out: &Path, write: impl FnOnce(&Path) -> EngineResult<()>) -> EngineResult<()> {
    ensure_parent_dir(out)?;
    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let suffix = out
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let partial = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| EngineError::Other(e.into()))?
        .into_temp_path();
    write(&partial)?;
    partial.persist(out).map_err(|e| {
        let target = out.display();
        EngineError::encode(format!("move encoded file to '{target}': {}", e.error))
    })?;
    Ok(())
}

/// Concatenate the exported segment files in `dir`, ordered by index prefix, into
/// [`FINAL_OUTPUT_NAME`] with stream copy. Earlier concatenations and full-timeline videos are
/// ignored.
#[tracing::instrument]
pub fn concat_existing(dir: &Path) -> EngineResult<PathBuf> {
    let read = std::fs::read_dir(dir).map_err(|e| {
        EngineError::validation(format!("read directory '{}': {e}", dir.display()))
    })?;
    let mut names = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| EngineError::Other(e.into()))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_segment_file(&name) && entry.path().is_file() {
            names.push(name);
        }
    }
    sort_by_index_prefix(&mut names);
    if names.is_empty() {
        return Err(EngineError::validation(format!(
            "no segment files found in '{}'",
            dir.display()
        )));
    }
    for n in names.iter().filter(|n| parse_index_prefix(n).is_none()) {
        warn!(file = %n, "no index prefix; appended last");
    }

    let inputs: Vec<PathBuf> = names.iter().map(|n| dir.join(n)).collect();
    let list_dir = tempfile::tempdir().map_err(|e| EngineError::Other(e.into()))?;
    let out = dir.join(FINAL_OUTPUT_NAME);
    concat_copy(&inputs, &list_dir.path().join("segments.txt"), &out)?;
    info!(path = %out.display(), files = inputs.len(), "segments concatenated");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
