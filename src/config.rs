use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{MatteError, MatteResult};
use crate::key::params::KeyParams;
use crate::render::BackendKind;
use crate::session::playback::DEFAULT_PLAY_RETRY_INTERVAL;

/// Default delay before the embedded document re-measures its canvas.
pub const DEFAULT_RESIZE_RETRY_MS: u32 = 100;

/// Everything needed to mount a compositor, loadable from JSON with every field optional.
///
/// ```json
/// {
///   "key": { "key_color": "#00FF08", "threshold": 0.45 },
///   "surface": { "logical_width": 200, "logical_height": 112.5, "device_pixel_ratio": 3 },
///   "backend": "gpu"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatteConfig {
    /// Keying parameters.
    pub key: KeyParams,
    /// Output surface size.
    pub surface: SurfaceSize,
    /// Native compositor implementation.
    pub backend: BackendKind,
    /// Ticks between refused play attempts.
    pub play_retry_interval: u32,
    /// Embedded host: delay of the second canvas sizing attempt, in milliseconds.
    pub resize_retry_ms: u32,
}

impl Default for MatteConfig {
    fn default() -> Self {
        Self {
            key: KeyParams::default(),
            surface: SurfaceSize::default(),
            backend: BackendKind::default(),
            play_retry_interval: DEFAULT_PLAY_RETRY_INTERVAL,
            resize_retry_ms: DEFAULT_RESIZE_RETRY_MS,
        }
    }
}

impl MatteConfig {
    /// Parse a config from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> MatteResult<Self> {
        serde_json::from_reader(r).map_err(|e| MatteError::serde(format!("parse config JSON: {e}")))
    }

    /// Parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> MatteResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MatteError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section.
    pub fn validate(&self) -> MatteResult<()> {
        self.key.validate()?;
        self.surface.validate()?;
        if self.play_retry_interval == 0 {
            return Err(MatteError::validation("play_retry_interval must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
