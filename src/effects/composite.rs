use crate::foundation::error::{EngineError, EngineResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8_scale};
use crate::render::backend::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// Source-over of one premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = unit_to_u8_scale(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return if op == 255 {
            src
        } else {
            [
                mul_div255_u8(u16::from(src[0]), op),
                mul_div255_u8(u16::from(src[1]), op),
                mul_div255_u8(u16::from(src[2]), op),
                255,
            ]
        };
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Source-over of equal-sized premultiplied buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> EngineResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(EngineError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a premultiplied `src_w`×`src_h` raster onto `dst` with its top-left at `(x, y)`.
/// Parts outside `dst` are clipped.
pub fn blit_over(
    dst: &mut FrameRGBA,
    src: &[u8],
    src_w: u32,
    src_h: u32,
    x: i32,
    y: i32,
    opacity: f32,
) -> EngineResult<()> {
    if src.len() != src_w as usize * src_h as usize * 4 {
        return Err(EngineError::validation(
            "blit_over source does not match its dimensions",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }
    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let x0 = i64::from(x).max(0);
    let y0 = i64::from(y).max(0);
    let x1 = (i64::from(x) + i64::from(src_w)).min(dw);
    let y1 = (i64::from(y) + i64::from(src_h)).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let span = (x1 - x0) as usize * 4;
    for dy in y0..y1 {
        let sy = (dy - i64::from(y)) as usize;
        let sx = (x0 - i64::from(x)) as usize;
        let s_off = (sy * src_w as usize + sx) * 4;
        let d_off = (dy as usize * dst.width as usize + x0 as usize) * 4;
        let drow = &mut dst.data[d_off..d_off + span];
        let srow = &src[s_off..s_off + span];
        for (d, s) in drow.chunks_exact_mut(4).zip(srow.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Overwrite every pixel of `dst` with `px`.
pub fn fill(dst: &mut FrameRGBA, px: PremulRgba8) {
    for d in dst.data.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

/// Opacity of a clip `local_sec` into its `duration_sec`, ramping up over `fade_in_sec` and down
/// over `fade_out_sec`.
pub fn fade_opacity(local_sec: f64, duration_sec: f64, fade_in_sec: f64, fade_out_sec: f64) -> f32 {
    let mut o = 1.0f64;
    if fade_in_sec > 0.0 {
        o *= (local_sec / fade_in_sec).clamp(0.0, 1.0);
    }
    if fade_out_sec > 0.0 {
        o *= ((duration_sec - local_sec) / fade_out_sec).clamp(0.0, 1.0);
    }
    o as f32
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
