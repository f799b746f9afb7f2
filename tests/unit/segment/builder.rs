use super::*;
use std::path::PathBuf;

fn clip(title: &str, start: f64, end: f64) -> ClipConfig {
    ClipConfig {
        id: title.to_owned(),
        title: title.to_owned(),
        video: None,
        result_image: None,
        background_image: None,
        start,
        end,
        text: "nice play".to_owned(),
        auto_center_align: true,
    }
}

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([100, 150, 200, 255]))
        .save(path)
        .unwrap();
}

fn names(seg: &Segment) -> Vec<&'static str> {
    seg.layers.iter().map(|l| l.name).collect()
}

#[test]
fn info_segment_without_assets_keeps_text_and_is_silent() {
    let style = StyleConfig::default_for(GameKind::Maimai);
    let text = TextRenderer::new(&AssetRef::Missing);
    let canvas = Canvas::new(320, 180).unwrap();
    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);

    let info = InfoClipConfig {
        id: "intro".into(),
        title: "Intro".into(),
        duration: 4.0,
        text: String::new(),
    };
    let seg = ctx
        .build_info_segment(&info, SegmentKind::Intro, 0)
        .unwrap();
    assert_eq!(seg.kind, SegmentKind::Intro);
    assert_eq!(seg.duration, 4.0);
    assert_eq!(names(&seg), vec!["black", "text"]);
    assert_eq!(seg.layers[1].position, (51, 32));
    assert!(seg.audio.is_none());
}

#[test]
fn info_segment_uses_text_box_and_bgm() {
    let dir = tempfile::tempdir().unwrap();
    let box_png = dir.path().join("box.png");
    write_png(&box_png, 160, 90);
    let bgm = dir.path().join("bgm.mp3");
    std::fs::write(&bgm, b"fake").unwrap();

    let mut style = StyleConfig::default_for(GameKind::Maimai);
    style.asset_paths.intro_text_bg = Some(box_png);
    style.asset_paths.intro_bgm = Some(bgm.clone());
    let text = TextRenderer::new(&AssetRef::Missing);
    let canvas = Canvas::new(320, 180).unwrap();
    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);

    let info = InfoClipConfig {
        id: String::new(),
        title: "Ending".into(),
        duration: 2.5,
        text: "thanks".into(),
    };
    let seg = ctx
        .build_info_segment(&info, SegmentKind::Ending, 7)
        .unwrap();
    assert_eq!(names(&seg), vec!["black", "text box", "text"]);
    assert_eq!(seg.layers[1].size(), Some((320, 180)));
    assert_eq!(
        seg.audio,
        Some(SegmentAudio {
            path: bgm,
            window: None,
            looped: true
        })
    );
}

#[test]
fn info_segment_rejects_non_positive_duration() {
    let style = StyleConfig::default_for(GameKind::Maimai);
    let text = TextRenderer::new(&AssetRef::Missing);
    let canvas = Canvas::new(320, 180).unwrap();
    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);
    let info = InfoClipConfig {
        id: String::new(),
        title: "Bad".into(),
        duration: 0.0,
        text: String::new(),
    };
    let built = ctx.build_info_segment(&info, SegmentKind::Intro, 0);
    assert!(built.is_err());
}

#[test]
fn content_segment_with_missing_assets_uses_placeholders() {
    let style = StyleConfig::default_for(GameKind::Maimai);
    let text = TextRenderer::new(&AssetRef::Missing);
    let ctx = BuildContext::new(GameKind::Maimai, &style, Canvas::default(), &text);

    let mut c = clip("Best 1", 2.0, 7.0);
    c.video = Some(PathBuf::from("/definitely/not/here.mp4"));
    let seg = ctx.build_content_segment(&c, 3, false).unwrap();

    assert_eq!(seg.index, 3);
    assert_eq!(seg.duration, 5.0);
    assert!(seg.audio.is_none());
    assert_eq!(
        names(&seg),
        vec!["black", "gameplay placeholder", "result placeholder", "text"]
    );
    assert_eq!(seg.layers[1].size(), Some((540, 540)));
    assert_eq!(seg.layers[1].position, (176, 354));
    assert_eq!(seg.layers[2].size(), Some((1920, 1080)));
    assert_eq!(seg.layers[3].position, (1036, 583));
}

#[test]
fn widescreen_placeholder_is_sixteen_by_nine() {
    let style = StyleConfig::default_for(GameKind::Chunithm);
    let text = TextRenderer::new(&AssetRef::Missing);
    let ctx = BuildContext::new(GameKind::Chunithm, &style, Canvas::default(), &text);
    let seg = ctx
        .build_content_segment(&clip("c", 0.0, 3.0), 0, false)
        .unwrap();
    assert_eq!(seg.layers[1].size(), Some((1280, 720)));
    assert_eq!(seg.layers[1].position, (81, 62));
}

#[test]
fn invalid_window_without_source_still_gets_a_duration() {
    let style = StyleConfig::default_for(GameKind::Maimai);
    let text = TextRenderer::new(&AssetRef::Missing);
    let canvas = Canvas::new(320, 180).unwrap();
    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);
    let seg = ctx
        .build_content_segment(&clip("x", -4.0, -1.0), 0, false)
        .unwrap();
    assert_eq!(seg.duration, 1.0);
}

#[test]
fn background_falls_back_to_style_default() {
    let dir = tempfile::tempdir().unwrap();
    let default_bg = dir.path().join("default.png");
    write_png(&default_bg, 32, 18);
    let own_bg = dir.path().join("own.png");
    write_png(&own_bg, 64, 64);

    let mut style = StyleConfig::default_for(GameKind::Maimai);
    style.asset_paths.content_bg = Some(default_bg);
    let text = TextRenderer::new(&AssetRef::Missing);
    let canvas = Canvas::new(320, 180).unwrap();

    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);
    let seg = ctx
        .build_content_segment(&clip("a", 0.0, 2.0), 0, false)
        .unwrap();
    assert_eq!(seg.layers[1].name, "background");
    assert_eq!(seg.layers[1].size(), Some((320, 180)));

    let mut own = clip("b", 0.0, 2.0);
    own.background_image = Some(own_bg);
    let seg = ctx.build_content_segment(&own, 1, false).unwrap();
    assert_eq!(seg.layers[1].size(), Some((320, 320)));

    style.options.override_content_default_bg = true;
    let ctx = BuildContext::new(GameKind::Maimai, &style, canvas, &text);
    let seg = ctx.build_content_segment(&own, 1, false).unwrap();
    assert_eq!(seg.layers[1].size(), Some((320, 180)));
}
