use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::Fps;
use crate::foundation::error::{MatteError, MatteResult};
use crate::media::frame::VideoFrame;
use crate::media::source::MemorySource;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Decode an encoded still image (PNG, JPEG, ...) into a straight-alpha frame.
pub fn decode_image(bytes: &[u8]) -> MatteResult<VideoFrame> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    VideoFrame::new(width, height, rgba.into_raw())
}

/// Read and decode one image file.
pub fn load_image(path: &Path) -> MatteResult<VideoFrame> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| MatteError::decode(format!("'{}': {e}", path.display())))
}

/// Frame files in `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> MatteResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read frame dir '{}'", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("read frame dir entry")?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)));
        if is_frame && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Load an image sequence as an in-memory source. Every frame must share the first frame's size.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_sequence(dir: &Path, fps: Fps) -> MatteResult<MemorySource> {
    let paths = list_frames(dir)?;
    if paths.is_empty() {
        return Err(MatteError::decode(format!(
            "no png/jpeg frames in '{}'",
            dir.display()
        )));
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let frame = load_image(path)?;
        if let Some(first) = frames.first().map(VideoFrame::size)
            && first != frame.size()
        {
            return Err(MatteError::decode(format!(
                "frame '{}' is {}x{}, expected {}x{}",
                path.display(),
                frame.width,
                frame.height,
                first.width,
                first.height
            )));
        }
        frames.push(frame);
    }

    tracing::debug!(frames = frames.len(), "loaded image sequence");
    Ok(MemorySource::new(frames, fps))
}

#[cfg(test)]
#[path = "../../tests/unit/media/sequence.rs"]
mod tests;
