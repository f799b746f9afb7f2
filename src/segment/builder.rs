use std::path::Path;

use tracing::{info, warn};

use crate::assets::color::Rgba8;
use crate::assets::media::{VideoSourceInfo, VideoStreamSpec, decode_video_frame, probe_video};
use crate::assets::store::{AssetRef, PreparedImage, resolve_asset, scaled_height};
use crate::config::clip::{
    ClipConfig, ClipWindow, DEFAULT_INFO_TEXT, InfoClipConfig, WindowAdjustment, clamp_window,
};
use crate::config::game::GameKind;
use crate::config::style::{StyleConfig, TextStyle};
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{EngineError, EngineResult};
use crate::segment::model::{Layer, LayerSource, Segment, SegmentAudio, SegmentKind};
use crate::text::render::TextRenderer;
use crate::text::wrap::wrap_text;
use crate::vision::analyzer::find_circle_center;
use crate::vision::crop::compute_crop;

/// Brightness of intro/ending background video.
pub const INFO_BG_BRIGHTNESS: f32 = 0.75;
/// Brightness of content backgrounds (image or video).
pub const CONTENT_BG_BRIGHTNESS: f32 = 0.8;
/// Relative position of intro/ending text.
pub const INFO_TEXT_POSITION: (f64, f64) = (0.16, 0.18);
/// How far before the end of the source an extended last clip stops.
pub const EXTEND_TAIL_SECS: f64 = 5.0;

/// Inputs shared by every segment of one render.
pub struct BuildContext<'a> {
    pub game: GameKind,
    pub style: &'a StyleConfig,
    pub canvas: Canvas,
    pub text: &'a TextRenderer,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        game: GameKind,
        style: &'a StyleConfig,
        canvas: Canvas,
        text: &'a TextRenderer,
    ) -> Self {
        Self {
            game,
            style,
            canvas,
            text,
        }
    }

    /// Build an intro or ending segment.
    ///
    /// Layers: looping background video at 75 % brightness, text-box image, wrapped text.
    /// Audio: the style background music, looped to the duration.
    #[tracing::instrument(skip(self, clip), fields(title = %clip.title))]
    pub fn build_info_segment(
        &self,
        clip: &InfoClipConfig,
        kind: SegmentKind,
        index: usize,
    ) -> EngineResult<Segment> {
        if !clip.duration.is_finite() || clip.duration <= 0.0 {
            return Err(EngineError::validation(format!(
                "info clip '{}' needs a positive duration",
                clip.title
            )));
        }
        let duration = clip.duration;
        let assets = &self.style.asset_paths;
        let mut layers = vec![Layer::new("black", LayerSource::Solid(Rgba8::BLACK), (0, 0))];

        if let Some(info) =
            self.probe_asset("intro background video", assets.intro_video_bg.as_deref())
        {
            layers.push(Layer::new(
                "background video",
                LayerSource::Video {
                    spec: self.fit_width_stream(&info, duration),
                    brightness: INFO_BG_BRIGHTNESS,
                },
                (0, 0),
            ));
        }

        if let Some(img) = self.load_image("intro text box", assets.intro_text_bg.as_deref(), 1.0) {
            layers.push(Layer::new("text box", LayerSource::Image(img), (0, 0)));
        }

        let text = if clip.text.trim().is_empty() {
            DEFAULT_INFO_TEXT
        } else {
            clip.text.as_str()
        };
        let pos = self.canvas.rel_to_px(INFO_TEXT_POSITION);
        layers.push(self.text_layer(text, &self.style.intro_text_style, pos)?);

        let audio = match resolve_asset(assets.intro_bgm.as_deref()) {
            AssetRef::Found(path) => Some(SegmentAudio {
                path,
                window: None,
                looped: true,
            }),
            AssetRef::Missing => {
                warn!("background music missing; segment will be silent");
                None
            }
        };

        Ok(Segment {
            index,
            kind,
            title: clip.title.clone(),
            duration,
            layers,
            audio,
        })
    }

    /// Build a gameplay segment.
    ///
    /// Layers: black filler, background (video or image at 80 %), cropped source video, result
    /// image, comment text. Audio: the source video's audio over the clamped window. With
    /// `extend_to_tail`, the window ends [`EXTEND_TAIL_SECS`] before the source does.
    #[tracing::instrument(skip(self, clip), fields(title = %clip.title))]
    pub fn build_content_segment(
        &self,
        clip: &ClipConfig,
        index: usize,
        extend_to_tail: bool,
    ) -> EngineResult<Segment> {
        let profile = self.game.profile();
        let assets = &self.style.asset_paths;
        let options = &self.style.options;

        let mut layers = vec![Layer::new("black", LayerSource::Solid(Rgba8::BLACK), (0, 0))];

        let bg_video = if options.content_use_video_bg {
            let info = self.probe_asset(
                "content background video",
                assets.content_bg_video.as_deref(),
            );
            if info.is_none() {
                warn!("content background video unavailable; using background image");
            }
            info
        } else {
            None
        };

        let source = self.probe_asset("source video", clip.video.as_deref());
        let (window, source) = match source {
            Some(info) => {
                let end = if extend_to_tail {
                    info.duration_secs - EXTEND_TAIL_SECS
                } else {
                    clip.end
                };
                let (window, adjustments) = clamp_window(clip.start, end, info.duration_secs);
                log_adjustments(&adjustments);
                (window, Some(info))
            }
            None => {
                let (window, adjustments) = clamp_window(clip.start, clip.end, f64::INFINITY);
                log_adjustments(&adjustments);
                (window, None)
            }
        };
        let duration = window.duration();

        match bg_video {
            Some(info) => layers.push(Layer::new(
                "background video",
                LayerSource::Video {
                    spec: self.fit_width_stream(&info, duration),
                    brightness: CONTENT_BG_BRIGHTNESS,
                },
                (0, 0),
            )),
            None => {
                let bg = if options.override_content_default_bg {
                    resolve_asset(assets.content_bg.as_deref())
                } else {
                    resolve_asset(clip.background_image.as_deref()).or_else(|| {
                        warn!("clip background image missing; using style default");
                        resolve_asset(assets.content_bg.as_deref())
                    })
                };
                if let Some(img) =
                    self.load_image("background image", bg.path(), CONTENT_BG_BRIGHTNESS)
                {
                    layers.push(Layer::new("background", LayerSource::Image(img), (0, 0)));
                }
            }
        }

        let video_pos = self.canvas.rel_to_px(profile.video_position);
        let scaled_h = profile.video_height_ratio * f64::from(self.canvas.height);
        let target_h = (scaled_h.round() as u32).max(1);
        let audio = match &source {
            Some(info) => {
                let spec = self.gameplay_stream(info, window, target_h, clip.auto_center_align);
                layers.push(Layer::new(
                    "gameplay",
                    LayerSource::Video {
                        spec,
                        brightness: 1.0,
                    },
                    video_pos,
                ));
                info.has_audio.then(|| SegmentAudio {
                    path: info.source_path.clone(),
                    window: Some((window.start, duration)),
                    looped: false,
                })
            }
            None => {
                let (width, height) = profile.crop_shape.size_for_height(target_h);
                layers.push(Layer::new(
                    "gameplay placeholder",
                    LayerSource::Placeholder { width, height },
                    video_pos,
                ));
                None
            }
        };

        match self.load_image("result image", clip.result_image.as_deref(), 1.0) {
            Some(img) => layers.push(Layer::new("result", LayerSource::Image(img), (0, 0))),
            None => layers.push(Layer::new(
                "result placeholder",
                LayerSource::Placeholder {
                    width: self.canvas.width,
                    height: self.canvas.height,
                },
                (0, 0),
            )),
        }

        let text_pos = self.canvas.rel_to_px(profile.text_position);
        let style = self.style.content_text_style(self.game);
        layers.push(self.text_layer(&clip.text, &style, text_pos)?);

        Ok(Segment {
            index,
            kind: SegmentKind::Content,
            title: clip.title.clone(),
            duration,
            layers,
            audio,
        })
    }

    /// Scaled, cropped stream of the source video over `window`.
    fn gameplay_stream(
        &self,
        info: &VideoSourceInfo,
        window: ClipWindow,
        target_h: u32,
        auto_center_align: bool,
    ) -> VideoStreamSpec {
        let profile = self.game.profile();
        let scale = f64::from(target_h) / f64::from(info.height.max(1));
        let scaled_w = ((f64::from(info.width) * scale).round() as u32).max(1);

        let center = if profile.detect_center && auto_center_align {
            detect_center(info, window, self.game).map(|p| Point::new(p.x * scale, p.y * scale))
        } else {
            None
        };
        let crop = compute_crop(scaled_w, target_h, profile.crop_shape, center);

        VideoStreamSpec {
            source_path: info.source_path.clone(),
            start_secs: window.start,
            duration_secs: window.duration(),
            scale_to: (scaled_w, target_h),
            crop,
            looped: false,
        }
    }

    /// Looping stream scaled to the canvas width.
    fn fit_width_stream(&self, info: &VideoSourceInfo, duration: f64) -> VideoStreamSpec {
        let w = self.canvas.width;
        VideoStreamSpec {
            source_path: info.source_path.clone(),
            start_secs: 0.0,
            duration_secs: duration,
            scale_to: (w, scaled_height(info.width, info.height, w)),
            crop: None,
            looped: true,
        }
    }

    fn probe_asset(&self, what: &str, path: Option<&Path>) -> Option<VideoSourceInfo> {
        let AssetRef::Found(path) = resolve_asset(path) else {
            warn!("{what} missing");
            return None;
        };
        match probe_video(&path) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "{what} could not be probed");
                None
            }
        }
    }

    fn load_image(
        &self,
        what: &str,
        path: Option<&Path>,
        brightness: f32,
    ) -> Option<PreparedImage> {
        let AssetRef::Found(path) = resolve_asset(path) else {
            warn!("{what} missing");
            return None;
        };
        match PreparedImage::load_fit_width(&path, self.canvas.width, brightness) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "{what} could not be decoded");
                None
            }
        }
    }

    fn text_layer(&self, text: &str, style: &TextStyle, pos: (i32, i32)) -> EngineResult<Layer> {
        let lines = wrap_text(text, style.wrap_budget());
        let avail = (i64::from(self.canvas.width) - i64::from(pos.0)).max(1) as u32;
        let img = self.text.render(&lines, style, Some(avail))?;
        Ok(Layer::new("text", LayerSource::Image(img), pos))
    }
}

/// Detect the ring marker on the middle frame of `window`.
fn detect_center(info: &VideoSourceInfo, window: ClipWindow, game: GameKind) -> Option<Point> {
    let frame = match decode_video_frame(info, window.midpoint()) {
        Ok(f) => f,
        Err(e) => {
            info!(error = %e, "analysis frame unavailable; using geometric center");
            return None;
        }
    };
    let center = find_circle_center(&frame, game);
    match center {
        Some(p) => info!(x = p.x, y = p.y, "ring marker detected"),
        None => info!("ring marker not found; using geometric center"),
    }
    center
}

fn log_adjustments(adjustments: &[WindowAdjustment]) {
    for adj in adjustments {
        warn!(adjustment = %adj, "clip window adjusted");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/segment/builder.rs"]
mod tests;
