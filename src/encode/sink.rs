use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MatteError, MatteResult};
use crate::render::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Presentation rate of the pushed frames.
    pub fps: Fps,
}

/// Sink contract for consuming composited surfaces.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MatteResult<()>;
    /// Push one frame in strictly increasing presentation order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MatteResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MatteResult<()>;
}

fn check_order(last: Option<FrameIndex>, idx: FrameIndex) -> MatteResult<()> {
    match last {
        Some(prev) if idx <= prev => Err(MatteError::evaluation(format!(
            "frame {} pushed after frame {}",
            idx.0, prev.0
        ))),
        _ => Ok(()),
    }
}

fn check_size(cfg: Option<&SinkConfig>, frame: &FrameRGBA) -> MatteResult<()> {
    let cfg = cfg.ok_or_else(|| MatteError::evaluation("push_frame called before begin"))?;
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(MatteError::evaluation(format!(
            "frame is {}x{}, sink expects {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MatteResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MatteResult<()> {
        check_size(self.cfg.as_ref(), frame)?;
        check_order(self.frames.last().map(|(i, _)| *i), idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MatteResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes every pushed surface as a straight-alpha PNG named `frame_000042.png`.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last: Option<FrameIndex>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Create a sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last: None,
            written: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> MatteResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.last = None;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MatteResult<()> {
        check_size(self.cfg.as_ref(), frame)?;
        check_order(self.last, idx)?;
        let path = self.dir.join(format!("frame_{:06}.png", idx.0));
        write_png(&path, frame)?;
        self.last = Some(idx);
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> MatteResult<()> {
        tracing::info!(frames = self.written.len(), dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}

/// Write `frame` as a straight-alpha RGBA PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> MatteResult<()> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| MatteError::evaluation("frame buffer does not match its dimensions"))?;
    img.save(path)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
