pub(crate) mod clock;
pub(crate) mod playback;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::MatteResult;
use clock::{FrameClock, ManualClock};
use playback::{PlaybackSession, TickOutcome};

/// Tally of a driven session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks delivered to the session.
    pub ticks: u64,
    /// Ticks that composited a frame.
    pub frames_drawn: u64,
    /// Whether the run stopped on end-of-stream (as opposed to cancellation).
    pub ended: bool,
}

/// Tick `session` from `clock` until it ends or is cancelled.
///
/// There is no timeout: a source that never becomes ready keeps the loop alive until cancelled.
#[tracing::instrument(skip_all)]
pub fn run_until_ended(session: &mut PlaybackSession, clock: &mut dyn FrameClock) -> RunSummary {
    let mut summary = RunSummary::default();
    loop {
        let outcome = session.tick(clock.next_tick());
        match outcome {
            TickOutcome::Drawn => {
                summary.ticks += 1;
                summary.frames_drawn += 1;
            }
            TickOutcome::Skipped => summary.ticks += 1,
            TickOutcome::Ended => {
                summary.ticks += 1;
                summary.ended = true;
                return summary;
            }
            TickOutcome::Cancelled => return summary,
        }
    }
}

/// Drive `session` headlessly at its source's frame rate, pushing every composited surface.
///
/// Frame indices count ticks from the start of the run, so frames skipped while the source was
/// not ready leave gaps.
#[tracing::instrument(skip_all)]
pub fn render_to_sink(
    session: &mut PlaybackSession,
    sink: &mut dyn FrameSink,
) -> MatteResult<RunSummary> {
    let fps = session.source().fps();
    let size = session.compositor().surface_size();
    sink.begin(SinkConfig {
        width: size.width,
        height: size.height,
        fps,
    })?;

    let mut clock = ManualClock::new(fps.frame_duration());
    let mut summary = RunSummary::default();
    loop {
        let idx = FrameIndex(summary.ticks);
        match session.tick(clock.next_tick()) {
            TickOutcome::Drawn => {
                let frame = session.compositor_mut().readback()?;
                sink.push_frame(idx, &frame)?;
                summary.ticks += 1;
                summary.frames_drawn += 1;
            }
            TickOutcome::Skipped => summary.ticks += 1,
            TickOutcome::Ended => {
                summary.ticks += 1;
                summary.ended = true;
                break;
            }
            TickOutcome::Cancelled => break,
        }
    }
    sink.end()?;
    tracing::info!(
        frames = summary.frames_drawn,
        ticks = summary.ticks,
        "headless render finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
