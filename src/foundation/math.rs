/// Hermite interpolation with GLSL `smoothstep` semantics.
///
/// Returns 0 at or below `edge0`, 1 at or above `edge1` and `t*t*(3-2t)` in between. When the
/// edges coincide the result is a hard step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn unorm8_to_f32(v: u8) -> f32 {
    f32::from(v) / 255.0
}

/// Quantize a normalized channel the way an `Rgba8Unorm` render target stores it.
pub(crate) fn f32_to_unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Undo alpha premultiplication of one 8-bit channel, rounding to nearest.
pub(crate) fn unpremultiply_u8(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = u32::from(a);
    ((u32::from(c) * 255 + a / 2) / a).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
