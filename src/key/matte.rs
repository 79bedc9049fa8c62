use rayon::prelude::*;

use crate::foundation::error::{MatteError, MatteResult};
use crate::foundation::math::{f32_to_unorm8, smoothstep, unorm8_to_f32};
use crate::key::params::KeyParams;

/// Straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Pass 1: opacity for a pixel at RGB `distance` from the key color.
pub fn primary_alpha(distance: f32, params: &KeyParams) -> f32 {
    smoothstep(params.key_low(), params.key_high(), distance)
}

/// Pass 2: opacity multiplier for a green dominance of `spill = g - max(r, b)`.
pub fn spill_multiplier(spill: f32, params: &KeyParams) -> f32 {
    1.0 - smoothstep(params.spill_low, params.spill_high, spill)
}

/// Euclidean distance between `rgb` and the key color.
pub fn key_distance(rgb: [f32; 3], params: &KeyParams) -> f32 {
    let [kr, kg, kb] = params.key_color;
    let (dr, dg, db) = (rgb[0] - kr, rgb[1] - kg, rgb[2] - kb);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Green dominance over the stronger of red and blue.
pub fn spill_amount(rgb: [f32; 3]) -> f32 {
    rgb[1] - rgb[0].max(rgb[2])
}

/// Matte opacity for a normalized RGB sample: `min(pass1, pass2)`.
///
/// Spill suppression can only lower the primary key's opacity.
pub fn key_alpha(rgb: [f32; 3], params: &KeyParams) -> f32 {
    let a1 = primary_alpha(key_distance(rgb, params), params);
    let a2 = spill_multiplier(spill_amount(rgb), params);
    a1.min(a2)
}

/// Key one straight-alpha pixel. RGB passes through untouched; alpha is scaled by the matte.
pub fn key_pixel(px: Rgba8, params: &KeyParams) -> Rgba8 {
    let rgb = [
        unorm8_to_f32(px[0]),
        unorm8_to_f32(px[1]),
        unorm8_to_f32(px[2]),
    ];
    let alpha = unorm8_to_f32(px[3]) * key_alpha(rgb, params);
    [px[0], px[1], px[2], f32_to_unorm8(alpha)]
}

/// Key a tightly packed straight-alpha RGBA8 buffer in place.
pub fn key_rgba8_in_place(buf: &mut [u8], params: &KeyParams) -> MatteResult<()> {
    if !buf.len().is_multiple_of(4) {
        return Err(MatteError::evaluation(
            "key_rgba8_in_place expects an rgba8 buffer",
        ));
    }
    buf.par_chunks_exact_mut(4).for_each(|px| {
        let out = key_pixel([px[0], px[1], px[2], px[3]], params);
        px[3] = out[3];
    });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/key/matte.rs"]
mod tests;
