use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_frame_time_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frame_to_secs(FrameIndex(123));
    assert_eq!(fps.secs_to_frames_floor(secs + 1e-9), 123);
}

#[test]
fn fps_round_covers_fractional_durations() {
    let fps = Fps::default();
    assert_eq!(fps.secs_to_frames_round(9.0), 270);
    assert_eq!(fps.secs_to_frames_round(0.49 / 30.0), 0);
}

#[test]
fn canvas_requires_even_dimensions() {
    assert!(Canvas::new(1920, 1080).is_ok());
    assert!(Canvas::new(1921, 1080).is_err());
    assert!(Canvas::new(0, 1080).is_err());
}

#[test]
fn canvas_rel_to_px_truncates() {
    let c = Canvas::default();
    assert_eq!(c.rel_to_px((0.092, 0.328)), (176, 354));
    assert_eq!(c.rel_to_px((0.0, 0.0)), (0, 0));
}
