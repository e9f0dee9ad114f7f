//! Monotonic stopwatch used for elapsed time, ETA and redraw throttling.

use std::time::Duration;

use web_time::Instant;

/// A restartable stopwatch over a monotonic time source.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a clock that starts counting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restarts the clock, returning the time elapsed since the previous start.
    pub fn reset(&mut self) -> Duration {
        let previous = self.start;
        self.start = Instant::now();
        self.start.saturating_duration_since(previous)
    }

    /// Returns the time elapsed since the last start without restarting.
    #[must_use]
    pub fn peek(&self) -> Duration {
        Instant::now().saturating_duration_since(self.start)
    }
}
