use std::time::{Duration, Instant};

/// Source of display-refresh timestamps for a tick loop.
pub trait FrameClock {
    /// Wait for the next refresh and return its time since the clock started.
    fn next_tick(&mut self) -> Duration;
}

/// Real-time clock firing at a fixed interval, sleeping between ticks.
#[derive(Debug)]
pub struct IntervalClock {
    start: Instant,
    interval: Duration,
    next: Duration,
}

impl IntervalClock {
    /// Tick every `interval`, starting immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
            next: Duration::ZERO,
        }
    }

    /// A clock for a display refreshing `hz` times per second.
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(hz.max(1))))
    }
}

impl FrameClock for IntervalClock {
    fn next_tick(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if elapsed < self.next {
            std::thread::sleep(self.next - elapsed);
        } else if elapsed > self.next + self.interval {
            // Fell behind; drop the missed refreshes instead of bursting through them.
            let missed = (elapsed - self.next).as_nanos() / self.interval.as_nanos().max(1);
            self.next += self.interval * u32::try_from(missed).unwrap_or(u32::MAX);
        }
        let now = self.next;
        self.next += self.interval;
        now
    }
}

/// Deterministic clock advancing by a fixed step per tick, without sleeping.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Duration,
    step: Duration,
}

impl ManualClock {
    /// Start at zero and advance by `step` each tick.
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }

    /// Time the next tick will report.
    pub fn peek(&self) -> Duration {
        self.now
    }
}

impl FrameClock for ManualClock {
    fn next_tick(&mut self) -> Duration {
        let now = self.now;
        self.now += self.step;
        now
    }
}
