use super::*;

fn size(w: u32, h: u32) -> PixelSize {
    PixelSize {
        width: w,
        height: h,
    }
}

fn compositor(w: u32, h: u32) -> CpuCompositor {
    CpuCompositor::new(size(w, h), KeyParams::default()).unwrap()
}

#[test]
fn key_color_frame_leaves_surface_transparent() {
    let mut c = compositor(4, 3);
    c.draw(&VideoFrame::solid(8, 6, [0, 255, 8, 255]).unwrap())
        .unwrap();
    let out = c.readback().unwrap();
    assert!(out.premultiplied);
    assert!(out.data.iter().all(|&b| b == 0));
}

#[test]
fn foreground_is_opaque_and_unchanged() {
    let mut c = compositor(2, 2);
    c.draw(&VideoFrame::solid(2, 2, [200, 40, 30, 255]).unwrap())
        .unwrap();
    let out = c.readback().unwrap();
    assert_eq!(out.pixel(1, 1), [200, 40, 30, 255]);
}

#[test]
fn partial_source_alpha_is_premultiplied() {
    let mut c = compositor(1, 1);
    c.draw(&VideoFrame::solid(1, 1, [200, 100, 50, 128]).unwrap())
        .unwrap();
    let a = 128.0f32 / 255.0;
    let expect = |v: f32| (v / 255.0 * a * 255.0).round() as u8;
    assert_eq!(
        c.readback().unwrap().pixel(0, 0),
        [expect(200.0), expect(100.0), expect(50.0), 128]
    );
}

#[test]
fn each_draw_starts_from_a_clear_surface() {
    let mut c = compositor(2, 2);
    c.draw(&VideoFrame::solid(2, 2, [255, 0, 0, 255]).unwrap())
        .unwrap();
    c.draw(&VideoFrame::solid(2, 2, [0, 255, 8, 255]).unwrap())
        .unwrap();
    assert!(c.readback().unwrap().data.iter().all(|&b| b == 0));
}

#[test]
fn clear_resets_to_transparent_black() {
    let mut c = compositor(2, 2);
    c.draw(&VideoFrame::solid(2, 2, [255, 255, 255, 255]).unwrap())
        .unwrap();
    c.clear().unwrap();
    assert!(c.readback().unwrap().data.iter().all(|&b| b == 0));
}

#[test]
fn frame_is_scaled_top_row_first() {
    // Left column red, right column key green; top row kept, bottom row keyed.
    let data = vec![
        255, 0, 0, 255, 0, 255, 8, 255, //
        0, 255, 8, 255, 0, 255, 8, 255,
    ];
    let frame = VideoFrame::new(2, 2, data).unwrap();
    let mut c = compositor(2, 2);
    c.draw(&frame).unwrap();
    let out = c.readback().unwrap();
    assert_eq!(out.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(out.pixel(1, 0)[3], 0);
    assert_eq!(out.pixel(0, 1)[3], 0);
}

#[test]
fn bilinear_sampling_clamps_and_interpolates() {
    let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
    let frame = VideoFrame::new(2, 1, data).unwrap();
    let left_edge = sample_bilinear(&frame, 0.0, 0.5);
    assert_eq!(left_edge[0], 0.0);
    let mid = sample_bilinear(&frame, 0.5, 0.5);
    assert!((mid[0] - 0.5).abs() < 1e-6);
    let right_edge = sample_bilinear(&frame, 1.0, 0.5);
    assert_eq!(right_edge[0], 1.0);
}
