use super::*;
use crate::assets::color::Rgba8;
use crate::assets::media::VideoStreamSpec;
use crate::assets::store::PreparedImage;
use crate::segment::model::{Layer, SegmentKind};
use crate::timeline::assemble::assemble;
use std::path::PathBuf;
use std::sync::Arc;

fn canvas() -> Canvas {
    Canvas::new(4, 4).unwrap()
}

fn seg(title: &str, duration: f64, layers: Vec<Layer>) -> Segment {
    Segment {
        index: 0,
        kind: SegmentKind::Content,
        title: title.to_owned(),
        duration,
        layers,
        audio: None,
    }
}

fn solid(title: &str, duration: f64, color: Rgba8) -> Segment {
    seg(
        title,
        duration,
        vec![Layer::new("fill", LayerSource::Solid(color), (0, 0))],
    )
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

#[test]
fn solid_segment_fills_canvas() {
    let tl = Timeline::single(solid("red", 2.0, Rgba8::rgb(255, 0, 0)), 0.0);
    let frame = TimelineRenderer::new(&tl, canvas(), Fps::default())
        .render_at(1.0)
        .unwrap();
    assert!(frame.is_well_formed());
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
}

#[test]
fn image_layer_is_blitted_at_position() {
    let white = PreparedImage {
        width: 2,
        height: 2,
        rgba8_premul: Arc::new(vec![255; 16]),
    };
    let s = seg(
        "img",
        1.0,
        vec![
            Layer::new("black", LayerSource::Solid(Rgba8::BLACK), (0, 0)),
            Layer::new("img", LayerSource::Image(white), (1, 1)),
        ],
    );
    let frame = render_segment_frame(&s, canvas(), Fps::default(), 0.0).unwrap();
    assert_eq!(px(&frame, 1, 1), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 2, 2), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 0, 0), [0, 0, 0, 255]);
    assert_eq!(px(&frame, 3, 3), [0, 0, 0, 255]);
}

#[test]
fn placeholder_draws_nothing() {
    let s = seg(
        "p",
        1.0,
        vec![
            Layer::new("black", LayerSource::Solid(Rgba8::BLACK), (0, 0)),
            Layer::new(
                "missing",
                LayerSource::Placeholder {
                    width: 4,
                    height: 4,
                },
                (0, 0),
            ),
        ],
    );
    let frame = render_segment_frame(&s, canvas(), Fps::default(), 0.5).unwrap();
    assert!(frame.data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn fades_from_black() {
    let tl = Timeline::single(solid("white", 4.0, Rgba8::WHITE), 1.0);
    let mut r = TimelineRenderer::new(&tl, canvas(), Fps::default());
    assert_eq!(px(&r.render_at(0.0).unwrap(), 0, 0), [0, 0, 0, 255]);
    let mid = px(&r.render_at(0.5).unwrap(), 0, 0);
    assert!((120..=135).contains(&mid[0]), "{mid:?}");
    assert_eq!(mid[3], 255);
    assert_eq!(px(&r.render_at(2.0).unwrap(), 0, 0), [255, 255, 255, 255]);
}

#[test]
fn transition_blends_neighbours() {
    let tl = assemble(
        Vec::new(),
        vec![
            solid("a", 3.0, Rgba8::rgb(255, 0, 0)),
            solid("b", 3.0, Rgba8::rgb(0, 0, 255)),
        ],
        Vec::new(),
        1.0,
        false,
    );
    let frame = TimelineRenderer::new(&tl, canvas(), Fps::default())
        .render_at(2.5)
        .unwrap();
    let p = px(&frame, 0, 0);
    assert!(p[0] > 0 && p[2] > 0, "{p:?}");
}

#[test]
fn unreadable_video_is_skipped_and_released() {
    let video = LayerSource::Video {
        spec: VideoStreamSpec {
            source_path: PathBuf::from("definitely/not/here.mp4"),
            start_secs: 0.0,
            duration_secs: 3.0,
            scale_to: (4, 4),
            crop: None,
            looped: false,
        },
        brightness: 0.8,
    };
    let first = seg(
        "v",
        3.0,
        vec![
            Layer::new("black", LayerSource::Solid(Rgba8::BLACK), (0, 0)),
            Layer::new("video", video, (0, 0)),
        ],
    );
    let tl = assemble(
        Vec::new(),
        vec![first, solid("b", 3.0, Rgba8::WHITE)],
        Vec::new(),
        0.0,
        false,
    );
    let mut r = TimelineRenderer::new(&tl, canvas(), Fps::default());
    let frame = r.render_at(0.5).unwrap();
    assert_eq!(px(&frame, 0, 0), [0, 0, 0, 255]);
    r.render_at(4.0).unwrap();
    assert_eq!(r.open_readers(), 0);
}

#[test]
fn rejects_non_finite_time() {
    let tl = Timeline::single(solid("x", 1.0, Rgba8::WHITE), 0.0);
    let mut r = TimelineRenderer::new(&tl, canvas(), Fps::default());
    assert!(r.render_at(f64::NAN).is_err());
}
