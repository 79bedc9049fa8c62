pub(crate) mod ffmpeg;
pub(crate) mod frame;
pub(crate) mod sequence;
pub(crate) mod source;
pub(crate) mod uri;

use crate::foundation::core::Fps;
use crate::foundation::error::{MatteError, MatteResult};

/// Open a frame source for `uri`.
///
/// A local directory is read as an image sequence presented at `sequence_fps`; a single image is a
/// one-frame clip; anything else local is streamed through `ffmpeg`. Remote URIs cannot be decoded
/// natively and are only usable through the embedded host.
#[tracing::instrument(skip_all, fields(uri = %uri))]
pub fn open_source(
    uri: &uri::MediaUri,
    sequence_fps: Fps,
) -> MatteResult<Box<dyn source::FrameSource>> {
    let path = uri.local_path().ok_or_else(|| {
        MatteError::validation(format!(
            "'{uri}' is not a local file; only the embedded host can play it"
        ))
    })?;

    if path.is_dir() {
        return Ok(Box::new(sequence::load_sequence(&path, sequence_fps)?));
    }

    let is_still = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ["png", "jpg", "jpeg"].iter().any(|x| e.eq_ignore_ascii_case(x)));
    if is_still {
        let frame = sequence::load_image(&path)?;
        return Ok(Box::new(source::MemorySource::new(vec![frame], sequence_fps)));
    }

    Ok(Box::new(ffmpeg::FfmpegSource::open(&path)?))
}
