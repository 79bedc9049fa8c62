//! Shader sources and quad geometry shared by every GPU host.
//!
//! Both programs are generated from a [`KeyParams`], so the keying constants exist in exactly one
//! place. The WGSL program drives the native wgpu compositor; the GLSL ES 1.00 pair is embedded in
//! the web document served to the embedded host.

use crate::key::params::KeyParams;

/// Full-surface quad as a 4-vertex triangle strip, interleaved `pos.xy, uv.xy`.
///
/// UV `(0, 0)` maps to the top-left texel of the frame, so rows come out top-down.
pub const QUAD_VERTICES: [f32; 16] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 1.0, 1.0, //
    -1.0, 1.0, 0.0, 0.0, //
    1.0, 1.0, 1.0, 0.0,
];
/// Floats per quad vertex.
pub const QUAD_FLOATS_PER_VERTEX: usize = 4;
/// Byte stride between quad vertices.
pub const QUAD_STRIDE_BYTES: u64 = 16;
/// Byte offset of the position attribute.
pub const QUAD_POS_OFFSET_BYTES: u64 = 0;
/// Byte offset of the texture-coordinate attribute.
pub const QUAD_UV_OFFSET_BYTES: u64 = 8;
/// Vertices drawn per frame.
pub const QUAD_VERTEX_COUNT: u32 = 4;

/// Position attribute name in the GLSL vertex program.
pub const GLSL_ATTR_POS: &str = "a_pos";
/// Texture-coordinate attribute name in the GLSL vertex program.
pub const GLSL_ATTR_UV: &str = "a_uv";
/// WGSL vertex entry point.
pub const WGSL_VERTEX_ENTRY: &str = "vs";
/// WGSL fragment entry point.
pub const WGSL_FRAGMENT_ENTRY: &str = "fs";

/// Quad vertices as little-endian bytes, ready for a vertex buffer upload.
pub fn quad_vertex_bytes() -> Vec<u8> {
    QUAD_VERTICES.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// WGSL program (vertex pass-through + two-pass keying fragment) for the native host.
pub fn wgsl_source(params: &KeyParams) -> String {
    let [r, g, b] = params.key_color;
    format!(
        r#"struct VsIn {{
  @location(0) pos: vec2<f32>,
  @location(1) uv: vec2<f32>,
}};

struct VsOut {{
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
}};

@vertex
fn {vs}(in: VsIn) -> VsOut {{
  var o: VsOut;
  o.pos = vec4<f32>(in.pos, 0.0, 1.0);
  o.uv = in.uv;
  return o;
}}

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var s_src: sampler;

const KEY_COLOR: vec3<f32> = vec3<f32>({r}, {g}, {b});
const THRESHOLD: f32 = {threshold};
const SMOOTHING: f32 = {smoothing};
const SPILL_LOW: f32 = {spill_low};
const SPILL_HIGH: f32 = {spill_high};

@fragment
fn {fs}(in: VsOut) -> @location(0) vec4<f32> {{
  let c = textureSample(t_src, s_src, in.uv);

  // Pass 1: distance key with a smooth band for chroma-subsampled edges.
  let diff = length(c.rgb - KEY_COLOR);
  var alpha = smoothstep(THRESHOLD - SMOOTHING, THRESHOLD + SMOOTHING, diff);

  // Pass 2: green spill suppression.
  let spill = c.g - max(c.r, c.b);
  let spill_alpha = 1.0 - smoothstep(SPILL_LOW, SPILL_HIGH, spill);

  alpha = min(alpha, spill_alpha);
  return vec4<f32>(c.rgb, c.a * alpha);
}}
"#,
        vs = WGSL_VERTEX_ENTRY,
        fs = WGSL_FRAGMENT_ENTRY,
        r = float_literal(r),
        g = float_literal(g),
        b = float_literal(b),
        threshold = float_literal(params.threshold),
        smoothing = float_literal(params.smoothing),
        spill_low = float_literal(params.spill_low),
        spill_high = float_literal(params.spill_high),
    )
}

/// GLSL ES 1.00 vertex pass-through for the embedded host.
pub fn glsl_vertex_source() -> String {
    format!(
        "attribute vec2 {pos};\n\
         attribute vec2 {uv};\n\
         varying vec2 v_uv;\n\
         void main() {{\n  gl_Position = vec4({pos}, 0.0, 1.0);\n  v_uv = {uv};\n}}\n",
        pos = GLSL_ATTR_POS,
        uv = GLSL_ATTR_UV,
    )
}

/// GLSL ES 1.00 keying fragment program for the embedded host.
///
/// Requests `highp` where available so the web canvas evaluates the matte at the same precision
/// as the native pipeline.
pub fn glsl_fragment_source(params: &KeyParams) -> String {
    let [r, g, b] = params.key_color;
    format!(
        r#"#ifdef GL_FRAGMENT_PRECISION_HIGH
precision highp float;
#else
precision mediump float;
#endif
uniform sampler2D u_tex;
varying vec2 v_uv;

const vec3 KEY_COLOR = vec3({r}, {g}, {b});
const float THRESHOLD = {threshold};
const float SMOOTHING = {smoothing};
const float SPILL_LOW = {spill_low};
const float SPILL_HIGH = {spill_high};

void main() {{
  vec4 c = texture2D(u_tex, v_uv);
  float diff = length(c.rgb - KEY_COLOR);
  float alpha = smoothstep(THRESHOLD - SMOOTHING, THRESHOLD + SMOOTHING, diff);
  float spill = c.g - max(c.r, c.b);
  float spillAlpha = 1.0 - smoothstep(SPILL_LOW, SPILL_HIGH, spill);
  alpha = min(alpha, spillAlpha);
  gl_FragColor = vec4(c.rgb, c.a * alpha);
}}
"#,
        r = float_literal(r),
        g = float_literal(g),
        b = float_literal(b),
        threshold = float_literal(params.threshold),
        smoothing = float_literal(params.smoothing),
        spill_low = float_literal(params.spill_low),
        spill_high = float_literal(params.spill_high),
    )
}

/// Shortest round-trip decimal for `v`, always a valid float literal in both WGSL and GLSL.
fn float_literal(v: f32) -> String {
    let s = format!("{v:?}");
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
#[path = "../tests/unit/shader.rs"]
mod tests;
