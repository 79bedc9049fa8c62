use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::media::source::{FrameSource, MediaStatus};
use crate::render::Compositor;

/// Callback fired once when playback reaches end-of-stream.
pub type EndedCallback = Box<dyn FnOnce()>;

/// Default number of ticks between refused play attempts.
pub const DEFAULT_PLAY_RETRY_INTERVAL: u32 = 30;

/// What one display tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The current frame was keyed and composited.
    Drawn,
    /// Nothing was drawn: the source is not ready, or the draw failed.
    Skipped,
    /// End-of-stream was observed; the loop is over.
    Ended,
    /// The session was cancelled or torn down.
    Cancelled,
}

/// Cancels a running session from outside the tick loop.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    live: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Stop the loop. The ended callback will not fire.
    pub fn cancel(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            tracing::debug!("playback session cancelled");
        }
    }

    /// Whether the loop is still scheduled.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

/// One mounted compositor: a frame source, an output surface, a liveness flag and a one-shot
/// end-of-stream callback.
///
/// Driven one display refresh at a time through [`PlaybackSession::tick`].
pub struct PlaybackSession {
    source: Box<dyn FrameSource>,
    compositor: Box<dyn Compositor>,
    live: Arc<AtomicBool>,
    on_ended: Option<EndedCallback>,
    ended: bool,

    play_retry_interval: u32,
    ticks_since_play_attempt: Option<u32>,

    ticks: u64,
    frames_drawn: u64,
}

impl PlaybackSession {
    /// Mount `compositor` on `source`. Playback is requested on the first tick.
    pub fn new(source: Box<dyn FrameSource>, compositor: Box<dyn Compositor>) -> Self {
        let size = compositor.surface_size();
        tracing::info!(width = size.width, height = size.height, "playback session created");
        Self {
            source,
            compositor,
            live: Arc::new(AtomicBool::new(true)),
            on_ended: None,
            ended: false,
            play_retry_interval: DEFAULT_PLAY_RETRY_INTERVAL,
            ticks_since_play_attempt: None,
            ticks: 0,
            frames_drawn: 0,
        }
    }

    /// Set the callback fired once on end-of-stream.
    pub fn on_ended(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_ended = Some(Box::new(callback));
        self
    }

    /// Ticks to wait between refused play attempts (at least 1).
    pub fn with_play_retry_interval(mut self, ticks: u32) -> Self {
        self.play_retry_interval = ticks.max(1);
        self
    }

    /// A handle that can cancel this session.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            live: Arc::clone(&self.live),
        }
    }

    /// Whether the loop is still scheduled.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Whether end-of-stream has been observed.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Ticks processed while live.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frames composited so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// The frame source.
    pub fn source(&self) -> &dyn FrameSource {
        self.source.as_ref()
    }

    /// The output surface.
    pub fn compositor(&self) -> &dyn Compositor {
        self.compositor.as_ref()
    }

    /// Mutable access to the output surface, e.g. for readback.
    pub fn compositor_mut(&mut self) -> &mut dyn Compositor {
        self.compositor.as_mut()
    }

    /// Run one animation-frame callback at time `now`.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        if self.ended {
            return TickOutcome::Ended;
        }
        if !self.is_live() {
            return TickOutcome::Cancelled;
        }
        self.ticks += 1;

        self.request_play();

        if self.source.advance(now) == MediaStatus::Ended {
            self.finish();
            return TickOutcome::Ended;
        }

        if !self.source.ready_state().can_draw() {
            return TickOutcome::Skipped;
        }
        let Some(frame) = self.source.current_frame() else {
            return TickOutcome::Skipped;
        };
        match self.compositor.draw(frame) {
            Ok(()) => {
                self.frames_drawn += 1;
                TickOutcome::Drawn
            }
            Err(e) => {
                tracing::warn!(error = %e, "frame draw failed; skipping");
                TickOutcome::Skipped
            }
        }
    }

    fn request_play(&mut self) {
        if self.source.is_playing() {
            return;
        }
        let due = match self.ticks_since_play_attempt {
            None => true,
            Some(n) => n + 1 >= self.play_retry_interval,
        };
        if !due {
            self.ticks_since_play_attempt = self.ticks_since_play_attempt.map(|n| n + 1);
            return;
        }
        self.ticks_since_play_attempt = Some(0);
        match self.source.play() {
            Ok(()) => tracing::debug!("playback started"),
            Err(e) => tracing::debug!(error = %e, "play request refused; will retry"),
        }
    }

    fn finish(&mut self) {
        self.ended = true;
        self.live.store(false, Ordering::Release);
        tracing::info!(frames_drawn = self.frames_drawn, "playback ended");
        if let Some(callback) = self.on_ended.take() {
            callback();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/playback.rs"]
mod tests;
