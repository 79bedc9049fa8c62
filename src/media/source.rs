use std::time::Duration;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MatteError, MatteResult};
use crate::media::frame::VideoFrame;

/// How much media a decoder has buffered, in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// Nothing is known about the media yet.
    Nothing = 0,
    /// Dimensions and duration are known; no frame is decoded.
    Metadata = 1,
    /// The frame for the current playback position is available.
    CurrentData = 2,
    /// The current frame and at least the next one are available.
    FutureData = 3,
    /// Enough is buffered to play through without stalling.
    EnoughData = 4,
}

impl ReadyState {
    /// Whether a frame may be sampled at this readiness level.
    pub fn can_draw(self) -> bool {
        self >= ReadyState::CurrentData
    }
}

/// Result of advancing a source to a new display tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaStatus {
    /// Playback continues (possibly paused or still buffering).
    Playing,
    /// The final frame has been presented; the source will never produce another.
    Ended,
}

/// A decoder that presents frames against a monotonic playback clock.
///
/// `now` is the time of the current display tick, measured from an arbitrary but fixed origin.
pub trait FrameSource {
    /// Request playback start. May fail (for example when autoplay is refused); callers retry.
    fn play(&mut self) -> MatteResult<()>;

    /// Whether a previous [`FrameSource::play`] call succeeded.
    fn is_playing(&self) -> bool;

    /// Move the presentation position to `now`.
    fn advance(&mut self, now: Duration) -> MediaStatus;

    /// Current readiness level.
    fn ready_state(&self) -> ReadyState;

    /// The frame at the current presentation position, if one is decoded.
    fn current_frame(&self) -> Option<&VideoFrame>;

    /// Nominal frame rate, used to pace headless rendering.
    fn fps(&self) -> Fps;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn play(&mut self) -> MatteResult<()> {
        (**self).play()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn advance(&mut self, now: Duration) -> MediaStatus {
        (**self).advance(now)
    }

    fn ready_state(&self) -> ReadyState {
        (**self).ready_state()
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        (**self).current_frame()
    }

    fn fps(&self) -> Fps {
        (**self).fps()
    }
}

/// Fully decoded frames held in memory and presented at a fixed rate.
///
/// Also models the two start-up hazards a real decoder has: a buffering delay before the first
/// frame becomes ready, and a number of refused play attempts.
#[derive(Clone, Debug)]
pub struct MemorySource {
    frames: Vec<VideoFrame>,
    fps: Fps,
    buffering: Duration,
    refuse_play: u32,

    playing: bool,
    started_at: Option<Duration>,
    current: Option<usize>,
    ready: ReadyState,
    ended: bool,
}

impl MemorySource {
    /// Create a source presenting `frames` at `fps`.
    pub fn new(frames: Vec<VideoFrame>, fps: Fps) -> Self {
        Self {
            frames,
            fps,
            buffering: Duration::ZERO,
            refuse_play: 0,
            playing: false,
            started_at: None,
            current: None,
            ready: ReadyState::Metadata,
            ended: false,
        }
    }

    /// Delay between playback start and the first frame becoming ready.
    pub fn with_buffering(mut self, delay: Duration) -> Self {
        self.buffering = delay;
        self
    }

    /// Refuse the first `attempts` calls to [`FrameSource::play`].
    pub fn with_refused_play(mut self, attempts: u32) -> Self {
        self.refuse_play = attempts;
        self
    }

    /// Number of frames in the clip.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the clip has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the presented frame, if any.
    pub fn position(&self) -> Option<FrameIndex> {
        self.current.map(|i| FrameIndex(i as u64))
    }
}

impl FrameSource for MemorySource {
    fn play(&mut self) -> MatteResult<()> {
        if self.playing {
            return Ok(());
        }
        if self.refuse_play > 0 {
            self.refuse_play -= 1;
            return Err(MatteError::evaluation("playback start was refused"));
        }
        self.playing = true;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn advance(&mut self, now: Duration) -> MediaStatus {
        if self.ended {
            return MediaStatus::Ended;
        }
        if !self.playing {
            return MediaStatus::Playing;
        }

        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        let Some(media_time) = elapsed.checked_sub(self.buffering) else {
            return MediaStatus::Playing;
        };

        let idx = self.fps.frame_at(media_time).0;
        match usize::try_from(idx) {
            Ok(i) if i < self.frames.len() => {
                self.current = Some(i);
                self.ready = if i + 1 < self.frames.len() {
                    ReadyState::EnoughData
                } else {
                    ReadyState::CurrentData
                };
                MediaStatus::Playing
            }
            _ => {
                self.ended = true;
                MediaStatus::Ended
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        self.current.and_then(|i| self.frames.get(i))
    }

    fn fps(&self) -> Fps {
        self.fps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
