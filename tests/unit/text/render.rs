use super::*;
use crate::assets::color::Rgba8;
use crate::config::style::StrokeStyle;

fn style(size: f32, align: TextAlign) -> TextStyle {
    TextStyle {
        font_size: size,
        color: Rgba8::WHITE,
        max_chars_per_line: 24,
        stroke: Some(StrokeStyle {
            color: Rgba8::BLACK,
            width: 2.0,
        }),
        interline: 6.5,
        align,
    }
}

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn xml_escape_handles_markup() {
    assert_eq!(xml_escape("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    assert_eq!(xml_escape("tab\there"), "tabhere");
}

#[test]
fn ink_edge_scans_alpha() {
    let mut data = vec![0u8; 4 * 3 * 2];
    data[(3 + 1) * 4 + 3] = 255; // row 1, x = 1
    let img = PreparedImage {
        width: 3,
        height: 2,
        rgba8_premul: Arc::new(data),
    };
    assert_eq!(ink_right_edge(&img), 2);
    assert_eq!(ink_right_edge(&PreparedImage::transparent(4, 4)), 0);
}

#[test]
fn blank_text_renders_margin_only() {
    let r = TextRenderer::new(&AssetRef::Missing);
    let img = r
        .render(&lines(&["", "  "]), &style(28.0, TextAlign::Left), None)
        .unwrap();
    assert_eq!((img.width, img.height), (40, 40));
}

#[test]
fn invalid_font_size_is_rejected() {
    let r = TextRenderer::new(&AssetRef::Missing);
    let rendered = r.render(&lines(&["x"]), &style(0.0, TextAlign::Left), None);
    assert!(rendered.is_err());
}

#[test]
fn renders_ink_with_system_font() {
    let r = TextRenderer::new(&AssetRef::Missing);
    if r.face_count() == 0 {
        eprintln!("skipping: no system fonts");
        return;
    }
    let text = lines(&["Hello", "world"]);
    let img = r
        .render(&text, &style(28.0, TextAlign::Center), None)
        .unwrap();
    assert!(img.width > 2 * TEXT_MARGIN_PX);
    assert!(img.height > 2 * TEXT_MARGIN_PX);
    assert!(img.rgba8_premul.chunks_exact(4).any(|p| p[3] > 0));
}

#[test]
fn auto_shrink_fits_available_width() {
    let r = TextRenderer::new(&AssetRef::Missing);
    if r.face_count() == 0 {
        eprintln!("skipping: no system fonts");
        return;
    }
    let text = lines(&["a fairly long line of commentary text"]);
    let wide = r
        .render(&text, &style(40.0, TextAlign::Left), None)
        .unwrap();
    let narrow = r
        .render(&text, &style(40.0, TextAlign::Left), Some(wide.width / 2))
        .unwrap();
    assert!(narrow.width < wide.width);
    assert!(narrow.height < wide.height);
}

/// Leftmost and one-past-rightmost inked columns within `rows`.
fn ink_span(img: &PreparedImage, rows: std::ops::Range<u32>) -> Option<(u32, u32)> {
    let w = img.width as usize;
    let mut span: Option<(u32, u32)> = None;
    for y in rows {
        let row = &img.rgba8_premul[y as usize * w * 4..(y as usize + 1) * w * 4];
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] != 0 {
                let x = x as u32;
                span = Some(match span {
                    Some((l, r)) => (l.min(x), r.max(x + 1)),
                    None => (x, x + 1),
                });
            }
        }
    }
    span
}

#[test]
fn short_line_follows_alignment() {
    let r = TextRenderer::new(&AssetRef::Missing);
    if r.face_count() == 0 {
        eprintln!("skipping: no system fonts");
        return;
    }
    let text = lines(&["a much wider first line", "ab"]);
    let s = style(28.0, TextAlign::Left);
    let second_line = {
        let line_h = s.font_size * LINE_HEIGHT_EM;
        let top = (TEXT_MARGIN_PX as f32 + line_h + s.interline / 2.0) as u32;
        move |img: &PreparedImage| top..img.height
    };

    let mut spans = Vec::new();
    for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right] {
        let img = r.render(&text, &style(28.0, align), None).unwrap();
        let first = ink_span(&img, 0..second_line(&img).start).unwrap();
        let second = ink_span(&img, second_line(&img)).unwrap();
        spans.push((img.width, first, second));
    }

    let (_, left_first, left_second) = spans[0];
    assert!(left_second.0.abs_diff(left_first.0) <= 4, "{spans:?}");

    let (width, _, center_second) = spans[1];
    let mid = (center_second.0 + center_second.1) / 2;
    assert!(mid.abs_diff(width / 2) <= 4, "{spans:?}");

    let (_, right_first, right_second) = spans[2];
    assert!(right_second.1.abs_diff(right_first.1) <= 4, "{spans:?}");

    assert!(left_second.0 < center_second.0 && center_second.0 < right_second.0);
}

#[test]
fn auto_shrink_stops_at_minimum_font_size() {
    let r = TextRenderer::new(&AssetRef::Missing);
    if r.face_count() == 0 {
        eprintln!("skipping: no system fonts");
        return;
    }
    let text = lines(&["Supercalifragilisticexpialidocious"]);
    let s = style(40.0, TextAlign::Left);
    for max_width in [60, 8] {
        let (size, _) = r.fit_font_size(&text, &s, Some(max_width)).unwrap();
        assert_eq!(size, MIN_FONT_SIZE_PX, "max_width {max_width}");
    }

    let squeezed = r.render(&text, &s, Some(60)).unwrap();
    let at_floor = r
        .render(&text, &style(MIN_FONT_SIZE_PX, TextAlign::Left), None)
        .unwrap();
    assert_eq!(squeezed.height, at_floor.height);
    assert!(squeezed.width >= at_floor.width.saturating_sub(2));
}
