use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::PixelSize;
use crate::foundation::math::{f32_to_unorm8, unorm8_to_f32};
use crate::key::matte::key_alpha;
use crate::media::frame::VideoFrame;
use crate::render::Compositor;
use crate::render::cpu::CpuCompositor;

fn doc(uri: &str) -> EmbeddedDocument {
    EmbeddedDocument::build(&MediaUri::parse(uri).unwrap(), &KeyParams::default()).unwrap()
}

#[test]
fn base_url_follows_the_media_origin() {
    assert_eq!(
        doc("http://192.168.0.10:8081/assets/logo1.mp4").base_url.as_deref(),
        Some("http://192.168.0.10:8081")
    );
    assert_eq!(
        doc("file:///data/bundle/video/logo1.mp4").base_url.as_deref(),
        Some("file:///data/bundle/video/")
    );
    assert_eq!(doc("logo1.mp4").base_url, None);
}

#[test]
fn document_embeds_shared_shaders_and_geometry() {
    let html = doc("file:///a/b.mp4").html;
    assert!(html.contains("const vec3 KEY_COLOR = vec3(0.0, 1.0, 0.031);"));
    assert!(html.contains("const float THRESHOLD = 0.45;"));
    assert!(html.contains("const float SMOOTHING = 0.15;"));
    assert!(html.contains("smoothstep(SPILL_LOW, SPILL_HIGH, spill)"));
    assert!(html.contains("new Float32Array([-1.0,-1.0,0.0,1.0,1.0,-1.0,1.0,1.0,-1.0,1.0,0.0,0.0,1.0,1.0,1.0,0.0])"));
    assert!(html.contains("gl.vertexAttribPointer(aUv, 2, gl.FLOAT, false, 16, 8);"));
    assert!(html.contains("gl.drawArrays(gl.TRIANGLE_STRIP, 0, 4);"));
}

#[test]
fn document_wires_gate_blend_sizing_and_completion() {
    let html = doc("file:///a/b.mp4").html;
    assert!(html.contains("video.readyState >= 2"));
    assert!(html.contains(
        "gl.blendFuncSeparate(gl.SRC_ALPHA, gl.ONE_MINUS_SRC_ALPHA, gl.ONE, gl.ONE_MINUS_SRC_ALPHA);"
    ));
    assert!(!html.contains("gl.blendFunc("));
    assert!(html.contains("gl.CLAMP_TO_EDGE"));
    assert!(html.contains("window.devicePixelRatio"));
    assert!(html.contains("setTimeout(initSize, 100);"));
    assert!(html.contains("cancelAnimationFrame(rafId);"));
    assert!(html.contains("notify('VIDEO_ENDED');"));
    assert!(html.contains("autoplay muted playsinline"));
}

// Blend one fragment onto a canvas cleared to transparent black, as the document does each frame.
fn canvas_over_cleared(rgba: [u8; 4], params: &KeyParams) -> [u8; 4] {
    let rgb = [rgba[0], rgba[1], rgba[2]].map(unorm8_to_f32);
    let a = unorm8_to_f32(rgba[3]) * key_alpha(rgb, params);
    let [src_rgb, dst_rgb, src_a, dst_a] = CANVAS_BLEND;
    let dst = [0.0f32; 4];
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = f32_to_unorm8(rgb[c] * src_rgb.weight(a) + dst[c] * dst_rgb.weight(a));
    }
    out[3] = f32_to_unorm8(a * src_a.weight(a) + dst[3] * dst_a.weight(a));
    out
}

#[test]
fn canvas_blend_matches_cpu_compositor_in_the_transition_band() {
    let params = KeyParams::default();
    for px in [[0, 110, 0, 255], [60, 200, 70, 255], [90, 160, 80, 200], [200, 40, 30, 255]] {
        let rgb = [px[0], px[1], px[2]].map(unorm8_to_f32);
        let mut cpu = CpuCompositor::new(
            PixelSize {
                width: 1,
                height: 1,
            },
            params,
        )
        .unwrap();
        cpu.draw(&VideoFrame::solid(1, 1, px).unwrap()).unwrap();
        let native = cpu.readback().unwrap().pixel(0, 0);
        let embedded = canvas_over_cleared(px, &params);
        for c in 0..4 {
            assert!(
                native[c].abs_diff(embedded[c]) <= 1,
                "{px:?}: native {native:?} embedded {embedded:?} (key alpha {})",
                key_alpha(rgb, &params)
            );
        }
    }
}

#[test]
fn partially_keyed_pixel_keeps_its_alpha_on_the_canvas() {
    let params = KeyParams::default();
    let px = [0, 110, 0, 255];
    let expected = key_alpha([0.0, 110.0 / 255.0, 0.0], &params);
    assert!(expected > 0.1 && expected < 0.9);
    assert_eq!(canvas_over_cleared(px, &params)[3], f32_to_unorm8(expected));
}

#[test]
fn options_flow_into_the_document() {
    let uri = MediaUri::parse("file:///a/b.mp4").unwrap();
    let html = EmbeddedDocument::build_with(
        &uri,
        &KeyParams::default(),
        EmbeddedOptions {
            resize_retry_ms: 250,
            play_retry_interval: 7,
        },
    )
    .unwrap()
    .html;
    assert!(html.contains("setTimeout(initSize, 250);"));
    assert!(html.contains(">= 7)"));
}

#[test]
fn media_uri_is_attribute_escaped() {
    let html = doc(r#"file:///a/"><script>x</script>.mp4"#).html;
    assert!(html.contains(r#"src="file:///a/&quot;&gt;&lt;script&gt;x&lt;/script&gt;.mp4""#));
    assert!(!html.contains("<script>x"));
}

#[test]
fn invalid_params_are_rejected() {
    let uri = MediaUri::parse("file:///a/b.mp4").unwrap();
    let bad = KeyParams {
        smoothing: 0.0,
        ..KeyParams::default()
    };
    assert!(EmbeddedDocument::build(&uri, &bad).is_err());
}

#[test]
fn host_fires_ended_once_for_the_completion_message_only() {
    let fired = Rc::new(Cell::new(0));
    let cb = Rc::clone(&fired);
    let mut host = EmbeddedHost::mount(
        &MediaUri::parse("http://h:1/v.mp4").unwrap(),
        &MatteConfig::default(),
        move || cb.set(cb.get() + 1),
    )
    .unwrap();
    assert_eq!(host.document().base_url.as_deref(), Some("http://h:1"));

    assert!(!host.handle_message("video_ended"));
    assert!(!host.handle_message("VIDEO_ENDED "));
    assert!(!host.has_ended());
    assert!(host.handle_message("VIDEO_ENDED"));
    assert!(!host.handle_message("VIDEO_ENDED"));
    assert!(host.has_ended());
    assert_eq!(fired.get(), 1);
}

#[test]
fn script_strings_cannot_close_the_script_element() {
    let s = script_string("a</script>b\n").unwrap();
    assert_eq!(s, r#""a<\/script>b\n""#);
}
