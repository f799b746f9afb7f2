use crate::foundation::core::Point;
use serde::{Deserialize, Serialize};

/// Relative aspect-ratio tolerance under which a source is left uncropped.
pub const ASPECT_TOLERANCE: f64 = 0.03;

/// Absolute slack (pixels) under which a source already counts as square.
const SQUARE_SLACK_PX: u32 = 2;

/// Target shape of the cropped gameplay region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropShape {
    /// 1:1, trimming only the longer source dimension.
    Square,
    /// 16:9.
    Widescreen,
}

impl CropShape {
    /// Width / height ratio of the shape.
    pub fn aspect(self) -> f64 {
        match self {
            Self::Square => 1.0,
            Self::Widescreen => 16.0 / 9.0,
        }
    }

    /// Size of a region of this shape that is `height` pixels tall.
    pub fn size_for_height(self, height: u32) -> (u32, u32) {
        let w = (f64::from(height) * self.aspect()).round() as u32;
        (w.max(1), height.max(1))
    }
}

/// Integer crop rectangle in source pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Return `true` when the rectangle lies inside a `width`×`height` source.
    pub fn is_within(self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }

    /// `ffmpeg` crop filter expression (`crop=w:h:x:y`).
    pub fn to_ffmpeg_filter(self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// Compute the crop for a `src_w`×`src_h` source.
///
/// Returns `None` when the source already matches `shape` (within [`ASPECT_TOLERANCE`]) or has a
/// degenerate size. The crop is sized from the limiting dimension (never upscaled), centered on
/// `center` when given (else the geometric center) and pushed flush against an edge it would
/// otherwise overflow.
pub fn compute_crop(
    src_w: u32,
    src_h: u32,
    shape: CropShape,
    center: Option<Point>,
) -> Option<CropRect> {
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let target = shape.aspect();
    let current = f64::from(src_w) / f64::from(src_h);
    if (current - target).abs() / target <= ASPECT_TOLERANCE {
        return None;
    }
    if shape == CropShape::Square && src_w.abs_diff(src_h) <= SQUARE_SLACK_PX {
        return None;
    }

    let center = center.filter(|p| p.x.is_finite() && p.y.is_finite());

    if current > target {
        // Too wide: keep full height, trim left/right.
        let crop_w = ((f64::from(src_h) * target).round() as u32).clamp(1, src_w);
        let cx = center.map_or(f64::from(src_w) / 2.0, |p| p.x);
        let x = place_on_axis(cx, crop_w, src_w);
        Some(CropRect {
            x,
            y: 0,
            width: crop_w,
            height: src_h,
        })
    } else {
        // Too tall: keep full width, trim top/bottom.
        let crop_h = ((f64::from(src_w) / target).round() as u32).clamp(1, src_h);
        let cy = center.map_or(f64::from(src_h) / 2.0, |p| p.y);
        let y = place_on_axis(cy, crop_h, src_h);
        Some(CropRect {
            x: 0,
            y,
            width: src_w,
            height: crop_h,
        })
    }
}

/// Start offset of a `len`-pixel window centered on `center`, clamped flush into `[0, total)`.
fn place_on_axis(center: f64, len: u32, total: u32) -> u32 {
    let max_start = total.saturating_sub(len);
    let start = (center - f64::from(len) / 2.0).round();
    if start <= 0.0 {
        0
    } else {
        (start as u32).min(max_start)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vision/crop.rs"]
mod tests;
