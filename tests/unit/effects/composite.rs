use super::*;

#[test]
fn over_opaque_replaces() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255], 1.0), [9, 8, 7, 255]);
}

#[test]
fn over_transparent_or_zero_opacity_is_noop() {
    let d = [10, 20, 30, 255];
    assert_eq!(over(d, [0, 0, 0, 0], 1.0), d);
    assert_eq!(over(d, [255, 255, 255, 255], 0.0), d);
}

#[test]
fn over_half_opacity_blends_toward_black() {
    let out = over([0, 0, 0, 255], [200, 100, 50, 255], 0.5);
    assert_eq!(out, [100, 50, 25, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut d = vec![0u8; 8];
    assert!(over_in_place(&mut d, &[0u8; 4], 1.0).is_err());
}

#[test]
fn blit_clips_to_destination() {
    let mut dst = FrameRGBA::transparent(4, 4);
    fill(&mut dst, [0, 0, 0, 255]);
    let src = [255u8, 255, 255, 255].repeat(4);
    blit_over(&mut dst, &src, 2, 2, 3, -1, 1.0).unwrap();
    // Only (3, 0) is covered.
    let px = |x: usize, y: usize| &dst.data[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
    assert_eq!(px(3, 0), &[255, 255, 255, 255]);
    assert_eq!(px(2, 0), &[0, 0, 0, 255]);
    assert_eq!(px(3, 1), &[0, 0, 0, 255]);
}

#[test]
fn blit_fully_outside_is_noop() {
    let mut dst = FrameRGBA::transparent(4, 4);
    let src = [255u8; 16];
    blit_over(&mut dst, &src, 2, 2, 10, 10, 1.0).unwrap();
    blit_over(&mut dst, &src, 2, 2, -2, 0, 1.0).unwrap();
    assert!(dst.data.iter().all(|&b| b == 0));
    assert!(blit_over(&mut dst, &src[..8], 2, 2, 0, 0, 1.0).is_err());
}

#[test]
fn fade_opacity_ramps_both_ends() {
    assert_eq!(fade_opacity(0.0, 5.0, 1.0, 1.0), 0.0);
    assert_eq!(fade_opacity(0.5, 5.0, 1.0, 1.0), 0.5);
    assert_eq!(fade_opacity(2.5, 5.0, 1.0, 1.0), 1.0);
    assert_eq!(fade_opacity(4.75, 5.0, 1.0, 1.0), 0.25);
    assert_eq!(fade_opacity(3.0, 5.0, 0.0, 0.0), 1.0);
}
