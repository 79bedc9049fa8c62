pub(crate) mod cpu;
#[cfg(feature = "gpu")]
pub(crate) mod gpu;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{MatteError, MatteResult};
use crate::foundation::math::unpremultiply_u8;
use crate::key::params::KeyParams;
use crate::media::frame::VideoFrame;

/// A read-back output surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, row-major, top row first.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Read one pixel. Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Straight-alpha copy of the pixel data. Fully transparent pixels become `0,0,0,0`.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            for px in out.chunks_exact_mut(4) {
                let a = px[3];
                for c in &mut px[..3] {
                    *c = unpremultiply_u8(*c, a);
                }
            }
        }
        out
    }
}

/// An output surface that keys video frames onto itself.
///
/// Every draw follows the same sequence: clear to transparent black, upload the frame, key every
/// pixel, then source-over blend one full-surface quad. Surfaces are premultiplied after blending.
pub trait Compositor {
    /// Physical size of the output surface, fixed at creation.
    fn surface_size(&self) -> PixelSize;

    /// Clear the surface to transparent black.
    fn clear(&mut self) -> MatteResult<()>;

    /// Clear, then key and composite `frame` scaled to the whole surface.
    fn draw(&mut self, frame: &VideoFrame) -> MatteResult<()>;

    /// Copy the surface back to host memory.
    fn readback(&mut self) -> MatteResult<FrameRGBA>;
}

impl<C: Compositor + ?Sized> Compositor for Box<C> {
    fn surface_size(&self) -> PixelSize {
        (**self).surface_size()
    }

    fn clear(&mut self) -> MatteResult<()> {
        (**self).clear()
    }

    fn draw(&mut self, frame: &VideoFrame) -> MatteResult<()> {
        (**self).draw(frame)
    }

    fn readback(&mut self) -> MatteResult<FrameRGBA> {
        (**self).readback()
    }
}

/// Compositor implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Reference rasterizer on the CPU.
    #[default]
    Cpu,
    /// wgpu render pipeline (requires the `gpu` feature and an adapter).
    Gpu,
}

impl std::str::FromStr for BackendKind {
    type Err = MatteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(MatteError::validation(format!(
                "unknown backend '{other}' (expected cpu or gpu)"
            ))),
        }
    }
}

/// Create a compositor of `kind` with a surface of `size` pixels.
pub fn create_compositor(
    kind: BackendKind,
    size: PixelSize,
    params: &KeyParams,
) -> MatteResult<Box<dyn Compositor>> {
    params.validate()?;
    if size.width == 0 || size.height == 0 {
        return Err(MatteError::validation("surface size must be non-zero"));
    }
    match kind {
        BackendKind::Cpu => Ok(Box::new(cpu::CpuCompositor::new(size, *params)?)),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(gpu::GpuCompositor::new(size, params)?)),
        #[cfg(not(feature = "gpu"))]
        BackendKind::Gpu => Err(MatteError::gpu(
            "gpu backend requires the 'gpu' feature",
        )),
    }
}

#[cfg(test)]
#[path = "../tests/unit/render.rs"]
mod tests;
