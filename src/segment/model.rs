use std::path::PathBuf;

use crate::assets::color::Rgba8;
use crate::assets::media::VideoStreamSpec;
use crate::assets::store::PreparedImage;
use serde::Serialize;

/// Role of a segment in the reel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Intro,
    Content,
    Ending,
}

/// Pixel content of one layer.
#[derive(Clone, Debug)]
pub enum LayerSource {
    /// Opaque fill of the whole canvas.
    Solid(Rgba8),
    /// Static premultiplied raster.
    Image(PreparedImage),
    /// Video decoded on demand while the segment is visible.
    Video {
        spec: VideoStreamSpec,
        /// Color multiplier applied to every decoded frame.
        brightness: f32,
    },
    /// Transparent stand-in for a missing asset; draws nothing.
    Placeholder { width: u32, height: u32 },
}

/// One positioned layer; layers draw bottom to top.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Short label for logs.
    pub name: &'static str,
    pub source: LayerSource,
    /// Top-left corner in canvas pixels.
    pub position: (i32, i32),
}

impl Layer {
    pub fn new(name: &'static str, source: LayerSource, position: (i32, i32)) -> Self {
        Self {
            name,
            source,
            position,
        }
    }

    /// Size in pixels, or `None` for canvas-filling layers.
    pub fn size(&self) -> Option<(u32, u32)> {
        match &self.source {
            LayerSource::Solid(_) => None,
            LayerSource::Image(img) => Some((img.width, img.height)),
            LayerSource::Video { spec, .. } => Some(spec.output_size()),
            LayerSource::Placeholder { width, height } => Some((*width, *height)),
        }
    }
}

/// Audio carried by a segment; decoded only when mixing.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentAudio {
    pub path: PathBuf,
    /// `(start, duration)` in source seconds; `None` plays the file from its beginning.
    pub window: Option<(f64, f64)>,
    /// Loop the source to cover the segment.
    pub looped: bool,
}

/// A fixed-duration unit of the reel: a config bound to a style and canvas.
#[derive(Clone, Debug)]
pub struct Segment {
    /// Position in export order.
    pub index: usize,
    pub kind: SegmentKind,
    pub title: String,
    /// Duration in seconds.
    pub duration: f64,
    pub layers: Vec<Layer>,
    pub audio: Option<SegmentAudio>,
}
