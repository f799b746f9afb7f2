use super::*;
use image::Luma;

fn ring_frame(w: u32, h: u32, center: (f64, f64), radius: f64, thickness: f64) -> FrameRGBA {
    let mut data = Vec::with_capacity(w as usize * h as usize * 4);
    for y in 0..h {
        for x in 0..w {
            let d = (f64::from(x) - center.0).hypot(f64::from(y) - center.1);
            let v = if (d - radius).abs() <= thickness / 2.0 {
                240
            } else {
                20
            };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    FrameRGBA {
        width: w,
        height: h,
        data,
        premultiplied: false,
    }
}

fn flat_frame(w: u32, h: u32, v: u8) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: [v, v, v, 255].repeat(w as usize * h as usize),
        premultiplied: false,
    }
}

#[test]
fn finds_synthetic_ring_center() {
    let frame = ring_frame(480, 270, (260.0, 135.0), 124.0, 6.0);
    let c = detect_circle(&frame).expect("ring should be detected");
    assert!((c.center.x - 260.0).abs() <= 3.0, "{c:?}");
    assert!((c.center.y - 135.0).abs() <= 3.0, "{c:?}");
    assert!((c.radius - 124.0).abs() <= 8.0, "{c:?}");
}

#[test]
fn downsampled_frames_report_source_coordinates() {
    let frame = ring_frame(960, 540, (520.0, 270.0), 248.0, 12.0);
    let c = detect_circle(&frame).expect("ring should be detected");
    assert!((c.center.x - 520.0).abs() <= 6.0, "{c:?}");
    assert!((c.center.y - 270.0).abs() <= 6.0, "{c:?}");
}

#[test]
fn blank_frame_has_no_circle() {
    assert!(detect_circle(&flat_frame(320, 180, 90)).is_none());
}

#[test]
fn degenerate_frames_degrade_to_none() {
    assert!(detect_circle(&flat_frame(8, 8, 0)).is_none());
    assert!(detect_circle(&flat_frame(0, 0, 0)).is_none());
    let broken = FrameRGBA {
        width: 100,
        height: 100,
        data: vec![0; 12],
        premultiplied: false,
    };
    assert!(detect_circle(&broken).is_none());
}

#[test]
fn widescreen_game_skips_detection() {
    let frame = ring_frame(480, 270, (240.0, 135.0), 124.0, 6.0);
    assert!(find_circle_center(&frame, GameKind::Chunithm).is_none());
    assert!(find_circle_center(&frame, GameKind::Maimai).is_some());
}

#[test]
fn adaptive_threshold_marks_bright_ring_and_dark_surround() {
    let mut img = GrayImage::from_pixel(40, 40, Luma([20]));
    for y in 0..40 {
        img.put_pixel(20, y, Luma([240]));
    }
    let binary = gaussian_adaptive_threshold(&img, THRESHOLD_SIGMA, THRESHOLD_C);
    assert_eq!(binary.get_pixel(20, 20)[0], 255);
    assert_eq!(binary.get_pixel(19, 20)[0], 0);
    assert_eq!(binary.get_pixel(2, 20)[0], 255);
}
