use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::config::game::GameKind;
use crate::foundation::core::Point;
use crate::render::backend::FrameRGBA;

/// Frames are analyzed at most this tall; taller frames are downscaled first.
const ANALYSIS_MAX_HEIGHT: u32 = 360;
/// Smallest analysis frame worth searching.
const MIN_ANALYSIS_DIM: usize = 16;

/// 5×5 median window.
const MEDIAN_RADIUS: u32 = 2;
/// Sigma of an 11-pixel Gaussian threshold block.
const THRESHOLD_SIGMA: f32 = 2.0;
const THRESHOLD_C: f32 = 2.0;
const EDGE_SMOOTH_SIGMA: f32 = 1.0;

const MIN_RADIUS_RATIO: f64 = 0.40;
const MAX_RADIUS_RATIO: f64 = 0.52;

/// Minimum share of the smallest circle's circumference that must vote for a center.
const MIN_SUPPORT_RATIO: f64 = 0.15;
const MIN_VOTES_FLOOR: u32 = 30;

/// Strongest circle found in a frame, in source-frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCandidate {
    /// Circle center.
    pub center: Point,
    /// Estimated radius.
    pub radius: f64,
    /// Accumulator support of the center (3×3 neighbourhood sum).
    pub votes: u32,
}

/// Locate the circular reference marker of `game`'s footage in `frame`.
///
/// Returns `None` when the game does not use center detection, the frame is unusable, or no
/// candidate clears the vote threshold. Never panics.
pub fn find_circle_center(frame: &FrameRGBA, game: GameKind) -> Option<Point> {
    if !game.profile().detect_center {
        return None;
    }
    detect_circle(frame).map(|c| c.center)
}

/// Search `frame` for one dominant circle with radius in `[0.40·h, 0.52·h]`.
pub fn detect_circle(frame: &FrameRGBA) -> Option<CircleCandidate> {
    if frame.width == 0 || frame.height == 0 || !frame.is_well_formed() {
        return None;
    }
    let gray = analysis_luma(frame)?;
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    if w < MIN_ANALYSIS_DIM || h < MIN_ANALYSIS_DIM {
        return None;
    }

    let denoised = median_filter(&gray, MEDIAN_RADIUS, MEDIAN_RADIUS);
    let binary = gaussian_adaptive_threshold(&denoised, THRESHOLD_SIGMA, THRESHOLD_C);
    let smoothed = gaussian_blur_f32(&binary, EDGE_SMOOTH_SIGMA);
    let gx = horizontal_sobel(&smoothed);
    let gy = vertical_sobel(&smoothed);

    let r_min = ((h as f64) * MIN_RADIUS_RATIO).round().max(1.0) as usize;
    let r_max = ((h as f64) * MAX_RADIUS_RATIO).round().max(r_min as f64) as usize;

    let mut edges = Vec::new();
    for (x, y, px) in binary.enumerate_pixels() {
        if px[0] != 255 {
            continue;
        }
        let dx = f32::from(gx.get_pixel(x, y)[0]);
        let dy = f32::from(gy.get_pixel(x, y)[0]);
        let mag = dx.hypot(dy);
        if mag > f32::EPSILON {
            edges.push((x as usize, y as usize, dx / mag, dy / mag));
        }
    }
    if edges.is_empty() {
        return None;
    }

    let mut acc = vec![0u32; w * h];
    for &(x, y, dx, dy) in &edges {
        for r in r_min..=r_max {
            let rf = r as f32;
            for sign in [1.0f32, -1.0] {
                let cx = (x as f32 + sign * rf * dx).round();
                let cy = (y as f32 + sign * rf * dy).round();
                if cx < 0.0 || cy < 0.0 || cx >= w as f32 || cy >= h as f32 {
                    continue;
                }
                acc[cy as usize * w + cx as usize] += 1;
            }
        }
    }

    let (best_x, best_y, votes) = strongest_peak(&acc, w, h)?;
    let support = MIN_SUPPORT_RATIO * std::f64::consts::TAU * r_min as f64;
    let min_votes = (support.round() as u32).max(MIN_VOTES_FLOOR);
    if votes < min_votes {
        return None;
    }

    let radius = estimate_radius(&edges, best_x, best_y, r_min, r_max)?;

    let sx = f64::from(frame.width) / w as f64;
    let sy = f64::from(frame.height) / h as f64;
    let center = Point::new(
        (best_x as f64 + 0.5) * sx - 0.5,
        (best_y as f64 + 0.5) * sy - 0.5,
    );
    if !(center.x.is_finite() && center.y.is_finite()) {
        return None;
    }
    Some(CircleCandidate {
        center,
        radius: radius * sy,
        votes,
    })
}

/// Luma plane of `frame`, downscaled so it is at most [`ANALYSIS_MAX_HEIGHT`] tall.
fn analysis_luma(frame: &FrameRGBA) -> Option<GrayImage> {
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())?;
    let gray = imageops::grayscale(&rgba);
    let factor = frame.height.div_ceil(ANALYSIS_MAX_HEIGHT).max(1);
    if factor == 1 {
        return Some(gray);
    }
    let (w, h) = (frame.width / factor, frame.height / factor);
    if w == 0 || h == 0 {
        return None;
    }
    Some(imageops::resize(&gray, w, h, FilterType::Triangle))
}

/// White where a pixel is brighter than its Gaussian-weighted local mean minus `c`.
fn gaussian_adaptive_threshold(image: &GrayImage, sigma: f32, c: f32) -> GrayImage {
    let mean = gaussian_blur_f32(image, sigma);
    let mut out = GrayImage::new(image.width(), image.height());
    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mean.pixels()) {
        if f32::from(src[0]) > f32::from(m[0]) - c {
            dst[0] = 255;
        }
    }
    out
}

/// Argmax of the 3×3 neighbourhood sum over the accumulator.
fn strongest_peak(acc: &[u32], w: usize, h: usize) -> Option<(usize, usize, u32)> {
    let mut best: Option<(usize, usize, u32)> = None;
    for y in 0..h {
        for x in 0..w {
            if acc[y * w + x] == 0 {
                continue;
            }
            let mut sum = 0u32;
            for yy in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for xx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    sum += acc[yy * w + xx];
                }
            }
            if best.is_none_or(|(_, _, v)| sum > v) {
                best = Some((x, y, sum));
            }
        }
    }
    best
}

/// Most common edge distance from the center within the search band.
fn estimate_radius(
    edges: &[(usize, usize, f32, f32)],
    cx: usize,
    cy: usize,
    r_min: usize,
    r_max: usize,
) -> Option<f64> {
    let mut hist = vec![0u32; r_max - r_min + 1];
    for &(x, y, _, _) in edges {
        let d = (x as f64 - cx as f64).hypot(y as f64 - cy as f64).round() as usize;
        if (r_min..=r_max).contains(&d) {
            hist[d - r_min] += 1;
        }
    }
    let (bin, count) = hist
        .iter()
        .enumerate()
        .max_by_key(|&(i, c)| (*c, std::cmp::Reverse(i)))?;
    (*count > 0).then_some((r_min + bin) as f64)
}

#[cfg(test)]
#[path = "../../tests/unit/vision/analyzer.rs"]
mod tests;
