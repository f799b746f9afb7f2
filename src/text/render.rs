use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::assets::store::{AssetRef, PreparedImage};
use crate::config::style::{TextAlign, TextStyle};
use crate::foundation::error::{EngineError, EngineResult};

/// Padding around the text block, in pixels.
pub const TEXT_MARGIN_PX: u32 = 20;
/// Auto-shrink never goes below this font size.
pub const MIN_FONT_SIZE_PX: f32 = 12.0;
const MAX_SHRINK_PASSES: usize = 4;

const LINE_HEIGHT_EM: f32 = 1.2;
const BASELINE_EM: f32 = 0.95;

/// Rasterizes wrapped text blocks through `usvg`/`resvg`.
///
/// Holds one font database (system fonts plus the configured comment font) shared by every
/// segment of a render.
pub struct TextRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
    family: Option<String>,
}

impl TextRenderer {
    /// Build a renderer using `font` when found, falling back to a system sans-serif face.
    pub fn new(font: &AssetRef) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        let family = match font.path() {
            Some(path) => match load_font_family(&mut db, path) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "comment font unusable; using system font"
                    );
                    None
                }
            },
            None => {
                tracing::warn!("comment font missing; using system font");
                None
            }
        };
        Self {
            fontdb: Arc::new(db),
            family,
        }
    }

    /// Number of font faces available for text.
    pub fn face_count(&self) -> usize {
        self.fontdb.faces().count()
    }

    /// Render `lines` with `style`.
    ///
    /// When `max_width` is given and the block (margins included) would be wider, the font size
    /// is scaled down proportionally, never below [`MIN_FONT_SIZE_PX`].
    pub fn render(
        &self,
        lines: &[String],
        style: &TextStyle,
        max_width: Option<u32>,
    ) -> EngineResult<PreparedImage> {
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(EngineError::validation("text font_size must be finite and > 0"));
        }
        let margin = TEXT_MARGIN_PX as f32;
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Ok(PreparedImage::transparent(TEXT_MARGIN_PX * 2, TEXT_MARGIN_PX * 2));
        }

        let (size, widths) = self.fit_font_size(lines, style, max_width)?;
        let block_w = widths.iter().copied().fold(0.0f32, f32::max);
        let stroke_w = style.stroke.map_or(0.0, |s| s.width);
        let line_h = size * LINE_HEIGHT_EM;
        let n = lines.len() as f32;
        let width = (block_w + 2.0 * margin).ceil().max(1.0) as u32;
        let height = (n * line_h + (n - 1.0) * style.interline + 2.0 * margin + stroke_w)
            .ceil()
            .max(1.0) as u32;

        let (anchor, x) = match style.align {
            TextAlign::Left => ("start", margin + stroke_w),
            TextAlign::Center => ("middle", margin + block_w / 2.0),
            TextAlign::Right => ("end", margin + block_w - stroke_w),
        };
        let mut body = String::new();
        for (i, line) in lines.iter().enumerate() {
            let y = margin + i as f32 * (line_h + style.interline) + size * BASELINE_EM;
            push_text_node(&mut body, line, x, y, anchor);
        }
        let svg = self.svg_document(width, height, size, style, &body);
        rasterize(&svg, width, height, &self.fontdb)
    }

    /// Font size that fits `max_width` (margins included) and the line widths at that size.
    fn fit_font_size(
        &self,
        lines: &[String],
        style: &TextStyle,
        max_width: Option<u32>,
    ) -> EngineResult<(f32, Vec<f32>)> {
        let mut size = style.font_size;
        let mut widths = self.measure_lines(lines, style, size)?;
        let Some(max_w) = max_width else {
            return Ok((size, widths));
        };
        let avail = max_w as f32 - 2.0 * TEXT_MARGIN_PX as f32;
        let floor = MIN_FONT_SIZE_PX.min(style.font_size);
        for _ in 0..MAX_SHRINK_PASSES {
            let block = widths.iter().copied().fold(0.0f32, f32::max);
            if block <= avail || size <= floor {
                break;
            }
            size = if avail > 0.0 {
                (size * avail / block).max(floor)
            } else {
                floor
            };
            widths = self.measure_lines(lines, style, size)?;
        }
        if size < style.font_size {
            tracing::debug!(from = style.font_size, to = size, "text shrunk to fit");
        }
        Ok((size, widths))
    }

    /// Ink width of each line at `size`, stroke included.
    fn measure_lines(
        &self,
        lines: &[String],
        style: &TextStyle,
        size: f32,
    ) -> EngineResult<Vec<f32>> {
        let stroke_w = style.stroke.map_or(0.0, |s| s.width);
        let x = stroke_w + 1.0;
        let height = (size * LINE_HEIGHT_EM + 2.0 * stroke_w + 2.0).ceil() as u32;
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            if line.trim().is_empty() {
                out.push(0.0);
                continue;
            }
            let approx = line.chars().count() as f32 * size * 1.2 + 4.0 * stroke_w + 8.0;
            let guess = approx.ceil() as u32;
            let mut body = String::new();
            push_text_node(&mut body, line, x, size * BASELINE_EM + stroke_w, "start");
            let svg = self.svg_document(guess, height, size, style, &body);
            let img = rasterize(&svg, guess, height, &self.fontdb)?;
            out.push(ink_right_edge(&img) as f32 + stroke_w);
        }
        Ok(out)
    }

    fn svg_document(
        &self,
        width: u32,
        height: u32,
        size: f32,
        style: &TextStyle,
        body: &str,
    ) -> String {
        let family = match &self.family {
            Some(f) => format!("'{}', sans-serif", xml_escape(f)),
            None => "sans-serif".to_owned(),
        };
        let mut paint = format!(
            r#"fill="{}" fill-opacity="{}""#,
            style.color.to_hex_rgb(),
            style.color.opacity()
        );
        if let Some(stroke) = style.stroke.filter(|s| s.width > 0.0) {
            let _ = write!(
                paint,
                r#" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linejoin="round" paint-order="stroke""#,
                stroke.color.to_hex_rgb(),
                stroke.color.opacity(),
                stroke.width * 2.0
            );
        }
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><g font-family="{family}" font-size="{size}" {paint}>{body}</g></svg>"#
        )
    }
}

fn load_font_family(db: &mut usvg::fontdb::Database, path: &Path) -> EngineResult<String> {
    let mut probe = usvg::fontdb::Database::new();
    probe
        .load_font_file(path)
        .map_err(|e| EngineError::media(format!("load font '{}': {e}", path.display())))?;
    let family = probe
        .faces()
        .find_map(|f| f.families.first().map(|(name, _)| name.clone()))
        .ok_or_else(|| {
            EngineError::media(format!("font '{}' has no family name", path.display()))
        })?;
    db.load_font_file(path)
        .map_err(|e| EngineError::media(format!("load font '{}': {e}", path.display())))?;
    Ok(family)
}

fn push_text_node(out: &mut String, line: &str, x: f32, y: f32, anchor: &str) {
    let _ = write!(
        out,
        r#"<text x="{x}" y="{y}" text-anchor="{anchor}" xml:space="preserve">{}</text>"#,
        xml_escape(line)
    );
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn rasterize(
    svg: &str,
    width: u32,
    height: u32,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> EngineResult<PreparedImage> {
    let opts = usvg::Options {
        fontdb: fontdb.clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opts)
        .map_err(|e| EngineError::validation(format!("text svg: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| EngineError::validation("failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

/// One past the rightmost column holding any ink.
fn ink_right_edge(img: &PreparedImage) -> u32 {
    let w = img.width as usize;
    let mut right = 0usize;
    for row in img.rgba8_premul.chunks_exact(w * 4) {
        for x in (right..w).rev() {
            if row[x * 4 + 3] != 0 {
                right = x + 1;
                break;
            }
        }
    }
    right as u32
}

#[cfg(test)]
#[path = "../../tests/unit/text/render.rs"]
mod tests;
