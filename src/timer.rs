//! A time-driven progress bar.
//!
//! [`Timer`] yields until a fixed duration passes. Its progress is the elapsed
//! fraction of that duration rather than a count of elements, so it drives the
//! bar through [`Progress::manual_set`] instead of ticking.
//!
//! ```
//! use std::time::Duration;
//! use iter_progress::Timer;
//!
//! let timer = Timer::new(Duration::from_millis(20)).with_output_sink(std::io::sink());
//! let progress = timer.progress();
//! let polls = timer.count();
//! assert!(polls > 0);
//! assert!(progress.is_finished());
//! ```

use std::{io::Write, iter::FusedIterator, time::Duration};

use compact_str::CompactString;

use crate::{
    clock::Clock,
    progress::{Progress, secs_to_duration},
};

/// Resolution of the bar: the duration is split into this many steps.
const STEPS: u64 = 1000;

/// An iterator yielding the elapsed time until `duration` has passed.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Debug)]
pub struct Timer {
    duration: Duration,
    clock: Clock,
    progress: Progress,
    started: bool,
    expired: bool,
}

impl Timer {
    /// Creates a timer drawing to standard error.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            clock: Clock::new(),
            progress: Progress::new(Some(STEPS)),
            started: false,
            expired: false,
        }
    }

    /// Returns a handle to the bar.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Sets the label drawn before the percentage.
    pub fn with_prefix(self, prefix: impl Into<CompactString>) -> Self {
        self.progress.set_prefix(prefix);
        self
    }

    /// Replaces the output sink.
    pub fn with_output_sink(self, sink: impl Write + 'static) -> Self {
        self.progress.set_output_sink(sink);
        self
    }

    /// Sets the minimum time between redraws, in seconds.
    pub fn with_min_update_time(self, seconds: f64) -> Self {
        self.progress.set_min_update_time(seconds);
        self
    }
}

impl Iterator for Timer {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.expired {
            return None;
        }
        if !self.started {
            self.started = true;
            self.clock.reset();
            self.progress.begin_traversal(None);
        }

        let elapsed = self.clock.peek();
        if elapsed >= self.duration {
            self.expired = true;
            self.progress.manual_set(1.0);
            self.progress.finish();
            return None;
        }

        self.progress
            .manual_set(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        self.progress.refresh_if_due();
        Some(elapsed)
    }
}

impl FusedIterator for Timer {}

/// A timer bar running for `seconds`.
pub fn tqdm_timer(seconds: f64) -> Timer {
    Timer::new(secs_to_duration(seconds))
}
