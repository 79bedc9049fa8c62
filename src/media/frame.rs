use std::sync::Arc;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{MatteError, MatteResult};

/// One decoded video frame: straight-alpha RGBA8, tightly packed, row-major, top row first.
///
/// Pixel data is shared so sources can hand out the current frame without copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Arc<Vec<u8>>,
}

impl VideoFrame {
    /// Wrap decoded pixels, checking the buffer length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> MatteResult<Self> {
        if width == 0 || height == 0 {
            return Err(MatteError::validation("video frame dimensions must be non-zero"));
        }
        let expected = PixelSize { width, height }.rgba8_len()?;
        if data.len() != expected {
            return Err(MatteError::decode(format!(
                "video frame has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// A frame filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> MatteResult<Self> {
        let len = PixelSize { width, height }.rgba8_len()?;
        Self::new(width, height, rgba.repeat(len / 4))
    }

    /// Frame dimensions.
    pub fn size(&self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Read one pixel. Coordinates are clamped to the frame.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}
