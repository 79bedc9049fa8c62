use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_parses_ffprobe_ratios() {
    assert_eq!(Fps::parse_ratio("30000/1001").unwrap(), Fps { num: 30000, den: 1001 });
    assert_eq!(Fps::parse_ratio("25").unwrap(), Fps { num: 25, den: 1 });
    assert!(Fps::parse_ratio("0/0").is_err());
    assert!(Fps::parse_ratio("abc").is_err());
}

#[test]
fn frame_at_uses_floor() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_at(Duration::ZERO), FrameIndex(0));
    assert_eq!(fps.frame_at(Duration::from_millis(33)), FrameIndex(0));
    assert_eq!(fps.frame_at(Duration::from_millis(34)), FrameIndex(1));
    assert_eq!(fps.frame_at(Duration::from_secs(2)), FrameIndex(60));
}

#[test]
fn pixel_size_scales_by_dpr() {
    let s = SurfaceSize::new(200.0, 112.5, 3.0).unwrap();
    assert_eq!(
        s.pixel_size(),
        PixelSize {
            width: 600,
            height: 337
        }
    );
}

#[test]
fn pixel_size_never_collapses_to_zero() {
    let s = SurfaceSize::new(0.2, 0.2, 1.0).unwrap();
    assert_eq!(s.pixel_size(), PixelSize { width: 1, height: 1 });
}

#[test]
fn splash_sizing_caps_width() {
    let narrow = SurfaceSize::splash_for_window(400.0, 2.0).unwrap();
    assert!((narrow.logical_width - 140.0).abs() < 1e-9);
    assert!((narrow.logical_height - 78.75).abs() < 1e-9);

    let wide = SurfaceSize::splash_for_window(1920.0, 1.0).unwrap();
    assert_eq!(wide.logical_width, 200.0);
    assert_eq!(wide.logical_height, 112.5);
}

#[test]
fn surface_rejects_bad_dimensions() {
    assert!(SurfaceSize::new(0.0, 10.0, 1.0).is_err());
    assert!(SurfaceSize::new(10.0, f64::NAN, 1.0).is_err());
    assert!(SurfaceSize::new(10.0, 10.0, -1.0).is_err());
}
