use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use image::imageops::FilterType;

use crate::foundation::error::EngineResult;
use crate::foundation::math::{mul_div255_u8, unit_to_u8_scale};

/// Outcome of looking up an optional asset on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetRef {
    /// The file exists.
    Found(PathBuf),
    /// No path was configured, or nothing exists at it.
    Missing,
}

impl AssetRef {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(p) => Some(p),
            Self::Missing => None,
        }
    }

    /// Keep `self` when found, else try `other`.
    pub fn or_else(self, other: impl FnOnce() -> AssetRef) -> AssetRef {
        match self {
            Self::Found(_) => self,
            Self::Missing => other(),
        }
    }
}

/// Resolve an optional configured path to a regular file.
pub fn resolve_asset(path: Option<&Path>) -> AssetRef {
    match path {
        Some(p) if p.is_file() => AssetRef::Found(p.to_path_buf()),
        _ => AssetRef::Missing,
    }
}

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Fully transparent image, used in place of missing overlays.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(vec![0u8; width as usize * height as usize * 4]),
        }
    }

    /// Decode an image file as-is.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let rgba = image::open(path)
            .with_context(|| format!("decode image '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        })
    }

    /// Decode an image file, scale it to `width` keeping its aspect ratio, and multiply its color
    /// channels by `brightness`.
    pub fn load_fit_width(path: &Path, width: u32, brightness: f32) -> EngineResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("decode image '{}'", path.display()))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        let target_h = scaled_height(w, h, width);
        let resized = if (w, h) == (width, target_h) {
            img
        } else {
            image::imageops::resize(&img, width, target_h, FilterType::Triangle)
        };
        let mut data = resized.into_raw();
        premultiply_rgba8_in_place(&mut data);
        if brightness < 1.0 {
            dim_premul_in_place(&mut data, brightness);
        }
        Ok(Self {
            width,
            height: target_h,
            rgba8_premul: Arc::new(data),
        })
    }
}

/// Height of a `w`×`h` raster scaled to `target_w` wide (at least 1).
pub fn scaled_height(w: u32, h: u32, target_w: u32) -> u32 {
    if w == 0 {
        return 1;
    }
    ((f64::from(h) * f64::from(target_w) / f64::from(w)).round() as u32).max(1)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

/// Multiply color channels by `factor` (alpha untouched).
pub(crate) fn dim_premul_in_place(rgba: &mut [u8], factor: f32) {
    let k = unit_to_u8_scale(factor);
    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), k);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
