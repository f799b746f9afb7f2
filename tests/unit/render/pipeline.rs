use super::*;
use crate::assets::color::Rgba8;
use crate::encode::sink::InMemorySink;
use crate::segment::model::{Layer, LayerSource, Segment, SegmentKind};
use crate::timeline::assemble::assemble;

fn solid(duration: f64, color: Rgba8) -> Segment {
    Segment {
        index: 0,
        kind: SegmentKind::Content,
        title: "s".to_owned(),
        duration,
        layers: vec![Layer::new("fill", LayerSource::Solid(color), (0, 0))],
        audio: None,
    }
}

#[test]
fn pushes_rounded_frame_count_without_audio() {
    let tl = assemble(
        Vec::new(),
        vec![solid(1.0, Rgba8::WHITE), solid(1.0, Rgba8::BLACK)],
        Vec::new(),
        0.5,
        false,
    );
    let fps = Fps::new(10, 1).unwrap();
    let mut sink = InMemorySink::new();
    let stats = render_timeline(&tl, Canvas::new(4, 2).unwrap(), fps, &mut sink).unwrap();

    assert_eq!(stats.frames, 15);
    assert_eq!(stats.audio_sources, 0);
    assert_eq!(sink.frames().len(), 15);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (4, 2));
    assert!(cfg.audio.is_none());
    assert_eq!(sink.frames()[14].0, FrameIndex(14));
}

#[test]
fn empty_timeline_is_rejected() {
    let mut sink = InMemorySink::new();
    let empty = Timeline::default();
    let err = render_timeline(&empty, Canvas::default(), Fps::default(), &mut sink);
    assert!(matches!(err, Err(EngineError::Validation(_))));
    assert!(sink.config().is_none());
}

#[test]
fn silent_timeline_mixes_nothing() {
    let tl = Timeline::single(solid(1.0, Rgba8::WHITE), 0.0);
    assert!(mix_timeline_audio(&tl).is_none());
}
