use crate::config::MatteConfig;
use crate::foundation::core::Fps;
use crate::media::open_source;
use crate::media::source::FrameSource;
use crate::media::uri::MediaUri;
use crate::render::create_compositor;
use crate::session::playback::PlaybackSession;

/// Frame rate assumed for image sequences, which carry no timing of their own.
pub const DEFAULT_SEQUENCE_FPS: Fps = Fps { num: 30, den: 1 };

/// Mount a compositor for `source` on a surface sized from `config`.
///
/// When no compositor can be created (no GPU context, invalid size) the failure is logged and
/// `None` is returned: nothing is drawn and `on_ended` is dropped without firing.
#[tracing::instrument(skip_all, fields(backend = ?config.backend))]
pub fn mount_native(
    source: Box<dyn FrameSource>,
    config: &MatteConfig,
    on_ended: impl FnOnce() + 'static,
) -> Option<PlaybackSession> {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "invalid compositor config; video will not be shown");
        return None;
    }
    let size = config.surface.pixel_size();
    match create_compositor(config.backend, size, &config.key) {
        Ok(compositor) => Some(
            PlaybackSession::new(source, compositor)
                .on_ended(on_ended)
                .with_play_retry_interval(config.play_retry_interval),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "no compositor available; video will not be shown");
            None
        }
    }
}

/// Resolve `uri` to a frame source and mount it. Unresolvable media degrades like a missing GPU.
pub fn mount_uri(
    uri: &MediaUri,
    config: &MatteConfig,
    on_ended: impl FnOnce() + 'static,
) -> Option<PlaybackSession> {
    match open_source(uri, DEFAULT_SEQUENCE_FPS) {
        Ok(source) => mount_native(source, config, on_ended),
        Err(e) => {
            tracing::warn!(error = %e, uri = %uri, "media could not be opened; video will not be shown");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/native.rs"]
mod tests;
