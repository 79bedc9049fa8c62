use rayon::prelude::*;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{MatteError, MatteResult};
use crate::foundation::math::{f32_to_unorm8, unorm8_to_f32};
use crate::key::matte::key_alpha;
use crate::key::params::KeyParams;
use crate::media::frame::VideoFrame;
use crate::render::{Compositor, FrameRGBA};

/// Reference rasterizer: the keying pipeline evaluated per output pixel in `f32`.
///
/// Sampling matches a linear, clamp-to-edge texture sampler at fragment centers, and blending
/// matches `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` for color with `ONE, ONE_MINUS_SRC_ALPHA` for alpha.
pub struct CpuCompositor {
    size: PixelSize,
    params: KeyParams,
    surface: Vec<u8>,
}

impl CpuCompositor {
    /// Allocate a transparent surface.
    pub fn new(size: PixelSize, params: KeyParams) -> MatteResult<Self> {
        params.validate()?;
        let len = size.rgba8_len()?;
        Ok(Self {
            size,
            params,
            surface: vec![0; len],
        })
    }
}

impl Compositor for CpuCompositor {
    fn surface_size(&self) -> PixelSize {
        self.size
    }

    fn clear(&mut self) -> MatteResult<()> {
        self.surface.fill(0);
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn draw(&mut self, frame: &VideoFrame) -> MatteResult<()> {
        if frame.width == 0 || frame.height == 0 {
            return Err(MatteError::evaluation("cannot draw an empty frame"));
        }
        self.clear()?;

        let (w, h) = (self.size.width as usize, self.size.height as usize);
        let params = &self.params;
        self.surface
            .par_chunks_exact_mut(w * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f32 + 0.5) / h as f32;
                for (x, dst) in row.chunks_exact_mut(4).enumerate() {
                    let u = (x as f32 + 0.5) / w as f32;
                    let src = sample_bilinear(frame, u, v);
                    let a = src[3] * key_alpha([src[0], src[1], src[2]], params);
                    blend_over(dst, [src[0], src[1], src[2]], a);
                }
            });
        Ok(())
    }

    fn readback(&mut self) -> MatteResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data: self.surface.clone(),
            premultiplied: true,
        })
    }
}

/// Bilinear sample at normalized `(u, v)` with clamp-to-edge addressing.
pub(crate) fn sample_bilinear(frame: &VideoFrame, u: f32, v: f32) -> [f32; 4] {
    let tx = u * frame.width as f32 - 0.5;
    let ty = v * frame.height as f32 - 0.5;
    let x0 = tx.floor();
    let y0 = ty.floor();
    let fx = tx - x0;
    let fy = ty - y0;

    let clamp_x = |x: f32| x.clamp(0.0, (frame.width - 1) as f32) as u32;
    let clamp_y = |y: f32| y.clamp(0.0, (frame.height - 1) as f32) as u32;
    let (xa, xb) = (clamp_x(x0), clamp_x(x0 + 1.0));
    let (ya, yb) = (clamp_y(y0), clamp_y(y0 + 1.0));

    let p00 = frame.pixel(xa, ya);
    let p10 = frame.pixel(xb, ya);
    let p01 = frame.pixel(xa, yb);
    let p11 = frame.pixel(xb, yb);

    let mut out = [0.0f32; 4];
    for (c, o) in out.iter_mut().enumerate() {
        let top = lerp(unorm8_to_f32(p00[c]), unorm8_to_f32(p10[c]), fx);
        let bottom = lerp(unorm8_to_f32(p01[c]), unorm8_to_f32(p11[c]), fx);
        *o = lerp(top, bottom, fy);
    }
    out
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn blend_over(dst: &mut [u8], rgb: [f32; 3], a: f32) {
    let inv = 1.0 - a;
    for c in 0..3 {
        dst[c] = f32_to_unorm8(rgb[c] * a + unorm8_to_f32(dst[c]) * inv);
    }
    dst[3] = f32_to_unorm8(a + unorm8_to_f32(dst[3]) * inv);
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
