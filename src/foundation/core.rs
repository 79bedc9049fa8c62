use std::time::Duration;

use crate::foundation::error::{MatteError, MatteResult};

/// Absolute 0-based frame index in source presentation order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MatteResult<Self> {
        if den == 0 {
            return Err(MatteError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MatteError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Parse an ffprobe-style rate such as `30000/1001` or `25`.
    pub fn parse_ratio(s: &str) -> MatteResult<Self> {
        let s = s.trim();
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s, "1"),
        };
        let num = num
            .parse::<u32>()
            .map_err(|_| MatteError::validation(format!("invalid frame rate '{s}'")))?;
        let den = den
            .parse::<u32>()
            .map_err(|_| MatteError::validation(format!("invalid frame rate '{s}'")))?;
        Self::new(num, den)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Duration of one frame.
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Index of the frame presented at `elapsed` since playback start (floor semantics).
    pub fn frame_at(self, elapsed: Duration) -> FrameIndex {
        let frames = u128::from(self.num) * elapsed.as_nanos()
            / (u128::from(self.den) * 1_000_000_000u128);
        FrameIndex(u64::try_from(frames).unwrap_or(u64::MAX))
    }
}

/// Physical surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Number of RGBA8 bytes needed for a tightly packed buffer of this size.
    pub fn rgba8_len(self) -> MatteResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| MatteError::evaluation("surface buffer size overflow"))
    }
}

/// Output surface size in logical units plus the display's device pixel ratio.
///
/// The physical pixel size is derived once, at session start, via [`SurfaceSize::pixel_size`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceSize {
    /// Width in logical pixels.
    pub logical_width: f64,
    /// Height in logical pixels.
    pub logical_height: f64,
    /// Physical pixels per logical pixel.
    pub device_pixel_ratio: f64,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            logical_width: SPLASH_MAX_WIDTH,
            logical_height: SPLASH_MAX_WIDTH * SPLASH_ASPECT,
            device_pixel_ratio: 1.0,
        }
    }
}

const SPLASH_WIDTH_FRACTION: f64 = 0.35;
const SPLASH_MAX_WIDTH: f64 = 200.0;
const SPLASH_ASPECT: f64 = 9.0 / 16.0;

impl SurfaceSize {
    /// Create a validated surface size.
    pub fn new(logical_width: f64, logical_height: f64, device_pixel_ratio: f64) -> MatteResult<Self> {
        let s = Self {
            logical_width,
            logical_height,
            device_pixel_ratio,
        };
        s.validate()?;
        Ok(s)
    }

    /// Splash-screen sizing: 35% of the window width capped at 200 logical pixels, 16:9.
    pub fn splash_for_window(window_width: f64, device_pixel_ratio: f64) -> MatteResult<Self> {
        let w = (window_width * SPLASH_WIDTH_FRACTION).min(SPLASH_MAX_WIDTH);
        Self::new(w, w * SPLASH_ASPECT, device_pixel_ratio)
    }

    /// Reject non-finite or non-positive dimensions.
    pub fn validate(&self) -> MatteResult<()> {
        for (name, v) in [
            ("logical_width", self.logical_width),
            ("logical_height", self.logical_height),
            ("device_pixel_ratio", self.device_pixel_ratio),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MatteError::validation(format!(
                    "surface {name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// Physical size: `logical * dpr`, truncated per axis like a canvas dimension, at least 1.
    pub fn pixel_size(&self) -> PixelSize {
        fn axis(logical: f64, dpr: f64) -> u32 {
            let v = (logical * dpr).floor();
            if v >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                (v as u32).max(1)
            }
        }
        PixelSize {
            width: axis(self.logical_width, self.device_pixel_ratio),
            height: axis(self.logical_height, self.device_pixel_ratio),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
