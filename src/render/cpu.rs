use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::assets::media::VideoReader;
use crate::assets::store::dim_premul_in_place;
use crate::effects::composite::{blit_over, fade_opacity, fill, over, over_in_place};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{EngineError, EngineResult};
use crate::render::backend::FrameRGBA;
use crate::segment::model::{LayerSource, Segment};
use crate::timeline::assemble::Timeline;

/// Identifies one video layer: `(entry, slot within entry, layer)`.
type LayerKey = (usize, usize, usize);

/// Software compositor over a [`Timeline`].
///
/// Frames are requested by absolute time. Video layers are decoded by [`VideoReader`]s that are
/// opened the first time their segment is on screen and dropped once it leaves the screen, so at
/// most the currently visible streams hold decoder processes. Requests are expected in
/// non-decreasing time order; going backwards restarts every reader.
pub struct TimelineRenderer<'a> {
    timeline: &'a Timeline,
    canvas: Canvas,
    fps: Fps,
    readers: HashMap<LayerKey, VideoReader>,
    failed: HashSet<LayerKey>,
    scratch: FrameRGBA,
    layer_buf: Vec<u8>,
    last_t: f64,
}

impl<'a> TimelineRenderer<'a> {
    pub fn new(timeline: &'a Timeline, canvas: Canvas, fps: Fps) -> Self {
        Self {
            timeline,
            canvas,
            fps,
            readers: HashMap::new(),
            failed: HashSet::new(),
            scratch: FrameRGBA::transparent(canvas.width, canvas.height),
            layer_buf: Vec::new(),
            last_t: f64::NEG_INFINITY,
        }
    }

    /// Number of video decoders currently alive.
    pub fn open_readers(&self) -> usize {
        self.readers.len()
    }

    /// Composite the frame shown at absolute time `t` (premultiplied, opaque).
    pub fn render_at(&mut self, t: f64) -> EngineResult<FrameRGBA> {
        if !t.is_finite() {
            return Err(EngineError::validation("render time must be finite"));
        }
        if t < self.last_t {
            debug!(
                t,
                last = self.last_t,
                "render time went backwards; restarting decoders"
            );
            self.readers.clear();
            self.failed.clear();
        }
        self.last_t = t;

        let mut out = FrameRGBA::transparent(self.canvas.width, self.canvas.height);
        fill(&mut out, [0, 0, 0, 255]);

        let timeline = self.timeline;
        let mut live: HashSet<LayerKey> = HashSet::new();
        for (ei, entry) in timeline.entries.iter().enumerate() {
            if !entry.is_visible_at(t) {
                continue;
            }
            let local = t - entry.start;
            let opacity = fade_opacity(local, entry.duration, entry.fade_in, entry.fade_out);
            if opacity <= 0.0 {
                continue;
            }
            let (slot, segment, seg_local) = entry.body.slot_at(local);
            self.composite_segment(segment, seg_local, (ei, slot), &mut live)?;
            over_in_place(&mut out.data, &self.scratch.data, opacity)?;
        }

        let before = self.readers.len();
        self.readers.retain(|key, _| live.contains(key));
        if self.readers.len() != before {
            let closed = before - self.readers.len();
            debug!(closed, "video readers released");
        }
        Ok(out)
    }

    /// Draw every layer of `segment` at segment-local time `local` into the scratch frame.
    fn composite_segment(
        &mut self,
        segment: &Segment,
        local: f64,
        (entry, slot): (usize, usize),
        live: &mut HashSet<LayerKey>,
    ) -> EngineResult<()> {
        self.scratch.data.fill(0);
        let frame_idx = self.fps.secs_to_frames_floor(local.max(0.0) + 1e-9);

        for (li, layer) in segment.layers.iter().enumerate() {
            let (x, y) = layer.position;
            match &layer.source {
                LayerSource::Solid(color) => {
                    let px = color.to_premul();
                    if px[3] == 255 {
                        fill(&mut self.scratch, px);
                    } else {
                        for d in self.scratch.data.chunks_exact_mut(4) {
                            let out = over([d[0], d[1], d[2], d[3]], px, 1.0);
                            d.copy_from_slice(&out);
                        }
                    }
                }
                LayerSource::Image(img) => {
                    blit_over(
                        &mut self.scratch,
                        &img.rgba8_premul,
                        img.width,
                        img.height,
                        x,
                        y,
                        1.0,
                    )?;
                }
                LayerSource::Video { spec, brightness } => {
                    let key = (entry, slot, li);
                    live.insert(key);
                    if self.failed.contains(&key) {
                        continue;
                    }
                    if !self.readers.contains_key(&key) {
                        match VideoReader::open(spec, self.fps) {
                            Ok(r) => {
                                self.readers.insert(key, r);
                            }
                            Err(e) => {
                                warn!(layer = layer.name, error = %e, "video layer disabled");
                                self.failed.insert(key);
                                continue;
                            }
                        }
                    }
                    let Some(reader) = self.readers.get_mut(&key) else {
                        continue;
                    };
                    let frame = match reader.frame_at(frame_idx) {
                        Ok(Some(f)) => f,
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(layer = layer.name, error = %e, "video layer disabled");
                            self.readers.remove(&key);
                            self.failed.insert(key);
                            continue;
                        }
                    };
                    self.layer_buf.clear();
                    self.layer_buf.extend_from_slice(&frame.data);
                    let (w, h) = (frame.width, frame.height);
                    if *brightness < 1.0 {
                        dim_premul_in_place(&mut self.layer_buf, *brightness);
                    }
                    blit_over(&mut self.scratch, &self.layer_buf, w, h, x, y, 1.0)?;
                }
                LayerSource::Placeholder { .. } => {}
            }
        }
        Ok(())
    }
}

/// Render one segment alone at its local time `t`, without fades.
pub fn render_segment_frame(
    segment: &Segment,
    canvas: Canvas,
    fps: Fps,
    t: f64,
) -> EngineResult<FrameRGBA> {
    let timeline = Timeline::single(segment.clone(), 0.0);
    let t = t.clamp(0.0, (segment.duration - fps.frame_duration_secs()).max(0.0));
    TimelineRenderer::new(&timeline, canvas, fps).render_at(t)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
