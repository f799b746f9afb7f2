use super::*;

#[test]
fn text_style_reads_flat_style_keys() {
    let s: TextStyle = serde_json::from_str(
        r##"{
            "font_size": 24,
            "font_color": "#FF8000",
            "inline_max_chara": 12,
            "enable_stroke": true,
            "stroke_color": "#FFFFFF",
            "stroke_width": 2,
            "interline": 6.5,
            "horizontal_align": "center"
        }"##,
    )
    .unwrap();
    assert_eq!(s.font_size, 24.0);
    assert_eq!(s.color, Rgba8::rgb(255, 128, 0));
    assert_eq!(s.wrap_budget(), 24);
    assert_eq!(s.align, TextAlign::Center);
    assert_eq!(
        s.stroke,
        Some(StrokeStyle {
            color: Rgba8::WHITE,
            width: 2.0
        })
    );
}

#[test]
fn disabled_stroke_is_dropped() {
    let s: TextStyle =
        serde_json::from_str(r#"{"enable_stroke": false, "stroke_width": 3}"#).unwrap();
    assert!(s.stroke.is_none());
    assert_eq!(s.max_chars_per_line, 24);
}

#[test]
fn text_style_serializes_back_to_flat_keys() {
    let v = serde_json::to_value(TextStyle::default_intro()).unwrap();
    assert_eq!(v["inline_max_chara"], 26);
    assert_eq!(v["enable_stroke"], true);
    assert_eq!(v["horizontal_align"], "left");
}

#[test]
fn style_config_defaults_fill_missing_sections() {
    let s: StyleConfig = serde_json::from_str(
        r#"{"asset_paths": {"content_bg": "bg.png"}, "options": {"content_use_video_bg": true}}"#,
    )
    .unwrap();
    assert_eq!(
        s.asset_paths.content_bg.as_deref(),
        Some(std::path::Path::new("bg.png"))
    );
    assert!(s.options.content_use_video_bg);
    assert!(!s.options.override_content_default_bg);
    assert_eq!(s.intro_text_style, TextStyle::default_intro());
    assert_eq!(
        s.content_text_style(GameKind::Chunithm).max_chars_per_line,
        12
    );
}
