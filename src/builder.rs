//! Fluent interface for constructing [`Progress`] instances.
//!
//! [`Progress::new`] gives a bar with the defaults (30 cells, 0.15 s between
//! redraws, drawing to standard error). The [`ProgressBuilder`] sets everything up
//! front instead, and can wrap an iterator directly:
//!
//! ```
//! use iter_progress::ProgressBuilder;
//!
//! let words = ["alpha", "beta", "gamma"];
//! let bar = ProgressBuilder::new()
//!     .prefix("words ")
//!     .bar_size(20)
//!     .min_update_time(0.5)
//!     .sink(std::io::sink())
//!     .wrap(&words);
//!
//! let lengths: Vec<usize> = bar.map(|w| w.len()).collect();
//! assert_eq!(lengths, [5, 4, 5]);
//! ```

use std::{io::Write, time::Duration};

use compact_str::CompactString;

use crate::{
    iter::Tqdm,
    progress::{
        DEFAULT_BAR_SIZE, DEFAULT_MIN_UPDATE, Progress, ProgressState, secs_to_duration,
    },
};

/// A builder pattern for constructing configured [`Progress`] instances.
pub struct ProgressBuilder {
    prefix: CompactString,
    bar_size: usize,
    min_update: Duration,
    total: Option<u64>,
    sink: Option<Box<dyn Write>>,
}

impl Default for ProgressBuilder {
    fn default() -> Self {
        Self {
            prefix: CompactString::default(),
            bar_size: DEFAULT_BAR_SIZE,
            min_update: DEFAULT_MIN_UPDATE,
            total: None,
            sink: None,
        }
    }
}

impl ProgressBuilder {
    /// Starts from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label drawn before the percentage.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<CompactString>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the number of cells in the bar.
    #[must_use]
    pub const fn bar_size(mut self, size: usize) -> Self {
        self.bar_size = size;
        self
    }

    /// Sets the minimum time between redraws, in seconds.
    #[must_use]
    pub fn min_update_time(self, seconds: f64) -> Self {
        self.min_update_interval(secs_to_duration(seconds))
    }

    /// Sets the minimum time between redraws.
    #[must_use]
    pub const fn min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update = interval;
        self
    }

    /// Sets the total explicitly instead of taking it from the wrapped iterator.
    #[must_use]
    pub const fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets where the line is drawn. Defaults to standard error.
    #[must_use]
    pub fn sink(mut self, sink: impl Write + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Consumes the builder and returns the constructed [`Progress`].
    #[must_use]
    pub fn build(self) -> Progress {
        let sink = self
            .sink
            .unwrap_or_else(|| Box::new(std::io::stderr()));
        let mut state = ProgressState::new(self.total, sink);
        state.prefix = self.prefix;
        state.bar_width = self.bar_size;
        state.min_update = self.min_update;
        Progress::from_state(state)
    }

    /// Builds the [`Progress`] and wraps `seq` in it.
    #[must_use]
    pub fn wrap<S: IntoIterator>(self, seq: S) -> Tqdm<S::IntoIter> {
        Tqdm::with_progress(seq.into_iter(), self.build())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ProgressBuilder;
    use crate::testing::SharedSink;

    /// Defaults
    /// An unconfigured builder matches `Progress::new`.
    #[test]
    fn test_defaults() {
        let p = ProgressBuilder::new().sink(std::io::sink()).build();
        let state = p.state.borrow();
        assert_eq!(state.bar_width, 30);
        assert_eq!(state.min_update, Duration::from_millis(150));
        assert_eq!(state.prefix, "");
        assert_eq!(state.total, None);
    }

    /// Configuration Reaches The Line
    /// Prefix, bar size and explicit total all show up in the drawn line.
    #[test]
    fn test_configured_line() {
        let sink = SharedSink::default();
        let p = ProgressBuilder::new()
            .prefix("load ")
            .bar_size(4)
            .total(2)
            .sink(sink.clone())
            .build();

        p.begin_traversal(Some(100));
        p.tick();
        p.tick();
        p.finish();

        let draws = sink.draws();
        assert_eq!(draws.first().unwrap(), "load { 0.0%} [    ] ( 0.0s < ?)");
        assert!(draws.last().unwrap().starts_with("load {100.0%} [####]"));
    }
}
