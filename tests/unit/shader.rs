use super::*;

#[test]
fn default_constants_appear_verbatim() {
    let p = KeyParams::default();
    let wgsl = wgsl_source(&p);
    assert!(wgsl.contains("const KEY_COLOR: vec3<f32> = vec3<f32>(0.0, 1.0, 0.031);"));
    assert!(wgsl.contains("const THRESHOLD: f32 = 0.45;"));
    assert!(wgsl.contains("const SMOOTHING: f32 = 0.15;"));
    assert!(wgsl.contains("const SPILL_LOW: f32 = 0.3;"));
    assert!(wgsl.contains("const SPILL_HIGH: f32 = 0.55;"));

    let glsl = glsl_fragment_source(&p);
    assert!(glsl.contains("const vec3 KEY_COLOR = vec3(0.0, 1.0, 0.031);"));
    assert!(glsl.contains("const float THRESHOLD = 0.45;"));
    assert!(glsl.contains("const float SMOOTHING = 0.15;"));
    assert!(glsl.contains("const float SPILL_LOW = 0.3;"));
    assert!(glsl.contains("const float SPILL_HIGH = 0.55;"));
}

#[test]
fn custom_params_flow_into_both_programs() {
    let p = KeyParams {
        key_color: [0.0, 0.0, 1.0],
        threshold: 0.25,
        ..KeyParams::default()
    };
    assert!(wgsl_source(&p).contains("vec3<f32>(0.0, 0.0, 1.0)"));
    assert!(wgsl_source(&p).contains("const THRESHOLD: f32 = 0.25;"));
    assert!(glsl_fragment_source(&p).contains("vec3(0.0, 0.0, 1.0)"));
}

#[test]
fn both_programs_share_the_keying_expression() {
    let p = KeyParams::default();
    for src in [wgsl_source(&p), glsl_fragment_source(&p)] {
        assert!(src.contains("smoothstep(THRESHOLD - SMOOTHING, THRESHOLD + SMOOTHING, diff)"));
        assert!(src.contains("c.g - max(c.r, c.b)"));
        assert!(src.contains("1.0 - smoothstep(SPILL_LOW, SPILL_HIGH, spill)"));
        assert!(src.contains("c.a * alpha"));
    }
}

#[test]
fn vertex_program_names_the_quad_attributes() {
    let vs = glsl_vertex_source();
    assert!(vs.contains("attribute vec2 a_pos;"));
    assert!(vs.contains("attribute vec2 a_uv;"));
    assert!(wgsl_source(&KeyParams::default()).contains("fn vs(in: VsIn)"));
}

#[test]
fn quad_layout_is_consistent() {
    assert_eq!(QUAD_VERTICES.len(), QUAD_VERTEX_COUNT as usize * QUAD_FLOATS_PER_VERTEX);
    assert_eq!(QUAD_STRIDE_BYTES, (QUAD_FLOATS_PER_VERTEX * 4) as u64);
    assert_eq!(QUAD_UV_OFFSET_BYTES, QUAD_POS_OFFSET_BYTES + 8);
    assert_eq!(quad_vertex_bytes().len(), 64);
    // Top-left corner of clip space samples the top-left texel.
    assert_eq!(&QUAD_VERTICES[8..12], &[-1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn float_literals_always_carry_a_fraction() {
    assert_eq!(float_literal(1.0), "1.0");
    assert_eq!(float_literal(0.031), "0.031");
    assert!(float_literal(1e-7).contains('e'));
}
